//! CSV export with RFC 4180 quoting.

use crate::model::{Part, Shipment, Transaction, Vendor};

/// A record with a fixed column list.
pub trait CsvRecord {
    const COLUMNS: &'static [&'static str];

    /// One value per entry in [`Self::COLUMNS`], in the same order.
    fn fields(&self) -> Vec<String>;
}

/// Render `records` as CSV: a header row, then one row per record, CRLF line endings.
pub fn to_csv<T: CsvRecord>(records: &[T]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(join_row(T::COLUMNS.iter().map(|c| c.to_string())));

    for record in records {
        lines.push(join_row(record.fields().into_iter()));
    }

    let mut out = lines.join("\r\n");
    out.push_str("\r\n");
    out
}

fn join_row(fields: impl Iterator<Item = String>) -> String {
    fields.map(|f| escape_field(&f)).collect::<Vec<_>>().join(",")
}

fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

impl CsvRecord for Part {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "quantity",
        "reorder_point",
        "max_stock",
        "type",
        "source",
        "lead_time_days",
        "backorders",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.quantity.to_string(),
            self.reorder_point.to_string(),
            self.max_stock.to_string(),
            self.part_type.to_string(),
            opt(&self.source),
            opt(&self.lead_time_days),
            opt(&self.backorders),
        ]
    }
}

impl CsvRecord for Transaction {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "invoice_number",
        "date",
        "part_name",
        "type",
        "quantity",
        "from",
        "to",
        "role",
        "status",
        "approved_by",
        "blockchain_order_id",
        "blockchain_tx_hash",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.invoice_number.clone(),
            self.date.format("%Y-%m-%d").to_string(),
            self.part_name.clone(),
            self.tx_type.to_string(),
            self.quantity.to_string(),
            self.from_party.clone(),
            self.to_party.clone(),
            self.role.to_string(),
            self.status.to_string(),
            opt(&self.approved_by),
            opt(&self.blockchain_order_id),
            opt(&self.blockchain_tx_hash),
        ]
    }
}

impl CsvRecord for Shipment {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "transaction_id",
        "part_name",
        "quantity",
        "from",
        "to",
        "status",
        "last_update",
        "blockchain_order_id",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            opt(&self.transaction_id),
            self.part_name.clone(),
            self.quantity.to_string(),
            self.from_party.clone(),
            self.to_party.clone(),
            self.status.to_string(),
            self.updated_at.to_rfc3339(),
            opt(&self.blockchain_order_id),
        ]
    }
}

impl CsvRecord for Vendor {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "category",
        "relationship_type",
        "roles",
        "wallet_address",
        "rating",
        "fulfillment_rate",
        "supplied_parts",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.category.clone(),
            self.relationship_type.to_string(),
            self.roles.iter().map(|r| r.as_str()).collect::<Vec<_>>().join(";"),
            opt(&self.wallet_address),
            format!("{:.1}", self.rating),
            format!("{:.1}", self.fulfillment_rate),
            self.supplied_parts.join(";"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;

    fn header(csv: &str) -> &str {
        csv.split("\r\n").next().unwrap()
    }

    #[test]
    fn test_header_matches_columns() {
        let csv = to_csv(&demo::parts());
        assert_eq!(header(&csv), Part::COLUMNS.join(","));

        let csv = to_csv(&demo::transactions());
        assert_eq!(header(&csv), Transaction::COLUMNS.join(","));

        let csv = to_csv(&demo::shipments());
        assert_eq!(header(&csv), Shipment::COLUMNS.join(","));

        let csv = to_csv(&demo::vendors());
        assert_eq!(header(&csv), Vendor::COLUMNS.join(","));
    }

    #[test]
    fn test_one_row_per_record() {
        let parts = demo::parts();
        let csv = to_csv(&parts);
        let rows: Vec<_> = csv.trim_end_matches("\r\n").split("\r\n").collect();
        assert_eq!(rows.len(), parts.len() + 1);
    }

    #[test]
    fn test_empty_input_is_header_only() {
        let csv = to_csv::<Vendor>(&[]);
        assert_eq!(csv, format!("{}\r\n", Vendor::COLUMNS.join(",")));
    }

    #[test]
    fn test_fields_match_column_count() {
        for part in demo::parts() {
            assert_eq!(part.fields().len(), Part::COLUMNS.len());
        }
        for tx in demo::transactions() {
            assert_eq!(tx.fields().len(), Transaction::COLUMNS.len());
        }
        for shipment in demo::shipments() {
            assert_eq!(shipment.fields().len(), Shipment::COLUMNS.len());
        }
        for vendor in demo::vendors() {
            assert_eq!(vendor.fields().len(), Vendor::COLUMNS.len());
        }
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }
}
