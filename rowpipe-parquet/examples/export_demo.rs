//! Demonstration of a full export/scan cycle over an in-memory source.

use bytes::Bytes;
use rowpipe_parquet::{
    CancelToken, ConditionKind, FilterSet, PageRequest, RowGroupReader, RowsCursor, Scanner,
    SourceField, Value, WritePipeline, WriterConfig,
};

fn main() -> rowpipe_result::Result<()> {
    println!("=== rowpipe export demo ===\n");

    // A small sales-like dataset: 1,000 rows across 100-row groups.
    let mut source = RowsCursor::new(
        vec![
            SourceField::new("ProductId", "System.String"),
            SourceField::new("Price", "System.Double"),
            SourceField::new("Quantity", "System.Int32"),
        ],
        (0..1_000)
            .map(|i| {
                vec![
                    Some(Value::String(format!("Product {i}"))),
                    Some(Value::Double(1.3 * i as f64)),
                    Some(Value::Integer(i)),
                ]
            })
            .collect(),
    );

    let pipeline = WritePipeline::new(WriterConfig {
        row_group_size: 100,
        notify_after: 250,
        ..WriterConfig::default()
    });
    let mut progress = |rows: u64| println!("  wrote {rows} rows");
    let mut sink = Vec::new();
    let written = pipeline.write_to(&mut sink, &mut source, Some(&mut progress), &CancelToken::new())?;
    println!("export complete: {written} rows, {} bytes\n", sink.len());

    // Read back page 2 of the rows whose label contains "9".
    let reader = RowGroupReader::from_bytes(Bytes::from(sink))?;
    println!("file holds {} row groups", reader.row_group_count());

    let mut filters = FilterSet::new();
    filters.add(
        "ProductId",
        ConditionKind::Contains,
        Some(Value::String("9".into())),
        None,
    );
    let page = Scanner::default().scan(
        &reader,
        &PageRequest::new(2, 10, true),
        &filters,
        None,
        &CancelToken::new(),
    )?;

    println!(
        "page 2 of filtered scan: {} rows of {} matches",
        page.rows.len(),
        page.total_matched
    );
    for row in &page.rows {
        let label = row[0].as_ref().map(ToString::to_string).unwrap_or_default();
        println!("  {label}");
    }
    Ok(())
}
