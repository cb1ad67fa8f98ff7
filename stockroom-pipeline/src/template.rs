use stockroom_core::Column;

/// Suggested download name for the template.
pub const TEMPLATE_FILE_NAME: &str = "inventory_template.csv";

/// Example values, in `Column::ALL` order.
pub const EXAMPLE_ROW: [&str; 6] = ["Example Product", "SKU123", "Electronics", "100", "150", "50"];

/// The downloadable CSV template: the header row plus one example row.
pub fn csv_template() -> String {
    let header: Vec<&str> = Column::ALL.iter().map(|c| c.header()).collect();
    format!("{}\n{}\n", header.join(","), EXAMPLE_ROW.join(","))
}
