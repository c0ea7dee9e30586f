//! Arrow schemas for the persistence handoff.
//!
//! The pipeline hands records to the storage layer as Arrow `RecordBatch`es;
//! the storage layer owns table layout beyond these column definitions.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, Date32Builder, Float64Array, Float64Builder, Int32Array, Int32Builder,
    ListArray, ListBuilder, StringArray, StringBuilder, UInt64Builder,
};
use arrow::datatypes::{DataType, Date32Type, Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::{Deadline, FundingItem, LegalReference, PorkScore, RecordError};

fn utf8_list_field(name: &str) -> Field {
    Field::new(
        name,
        DataType::List(Arc::new(Field::new("item", DataType::Utf8, true))),
        false,
    )
}

/// Schema for `funding_items`.
pub fn funding_items_schema() -> Schema {
    Schema::new(vec![
        Field::new("amount_text", DataType::Utf8, false),
        Field::new("amount_numeric", DataType::Float64, true),
        Field::new("purpose", DataType::Utf8, true),
        Field::new("recipient", DataType::Utf8, true),
        Field::new("availability", DataType::Utf8, true),
        Field::new(
            "fiscal_years",
            DataType::List(Arc::new(Field::new("item", DataType::Int32, true))),
            false,
        ),
        Field::new("source_text", DataType::Utf8, false),
        Field::new("source_chunk_id", DataType::Utf8, false),
    ])
}

/// Schema for `legal_references`.
pub fn legal_references_schema() -> Schema {
    Schema::new(vec![
        Field::new("ref_type", DataType::Utf8, false),
        Field::new("ref_text", DataType::Utf8, false),
        Field::new("source_chunk_id", DataType::Utf8, false),
    ])
}

/// Schema for `deadlines`.
pub fn deadlines_schema() -> Schema {
    Schema::new(vec![
        Field::new("date_text", DataType::Utf8, false),
        Field::new("due_date", DataType::Date32, true),
        Field::new("action", DataType::Utf8, true),
        Field::new("responsible_entity", DataType::Utf8, true),
        Field::new("source_text", DataType::Utf8, false),
        Field::new("source_chunk_id", DataType::Utf8, false),
    ])
}

/// Schema for `pork_scores`.
pub fn pork_scores_schema() -> Schema {
    Schema::new(vec![
        Field::new("funding_item_id", DataType::UInt64, false),
        Field::new("heuristic_score", DataType::Float64, false),
        Field::new("ai_score", DataType::Float64, true),
        Field::new("blended_score", DataType::Float64, false),
        utf8_list_field("flags"),
        utf8_list_field("reasons"),
    ])
}

// ── Records → batches ──

pub fn funding_items_batch(items: &[FundingItem]) -> Result<RecordBatch, RecordError> {
    let mut amount_text = StringBuilder::new();
    let mut amount_numeric = Float64Builder::new();
    let mut purpose = StringBuilder::new();
    let mut recipient = StringBuilder::new();
    let mut availability = StringBuilder::new();
    let mut fiscal_years = ListBuilder::new(Int32Builder::new());
    let mut source_text = StringBuilder::new();
    let mut source_chunk_id = StringBuilder::new();

    for item in items {
        amount_text.append_value(&item.amount_text);
        amount_numeric.append_option(item.amount_numeric);
        purpose.append_option(item.purpose.as_deref());
        recipient.append_option(item.recipient.as_deref());
        availability.append_option(item.availability.as_deref());
        for &fy in &item.fiscal_years {
            fiscal_years.values().append_value(fy);
        }
        fiscal_years.append(true);
        source_text.append_value(&item.source_text);
        source_chunk_id.append_value(&item.source_chunk_id);
    }

    let columns: Vec<ArrayRef> = vec![
        Arc::new(amount_text.finish()),
        Arc::new(amount_numeric.finish()),
        Arc::new(purpose.finish()),
        Arc::new(recipient.finish()),
        Arc::new(availability.finish()),
        Arc::new(fiscal_years.finish()),
        Arc::new(source_text.finish()),
        Arc::new(source_chunk_id.finish()),
    ];
    Ok(RecordBatch::try_new(
        Arc::new(funding_items_schema()),
        columns,
    )?)
}

pub fn legal_references_batch(refs: &[LegalReference]) -> Result<RecordBatch, RecordError> {
    let mut ref_type = StringBuilder::new();
    let mut ref_text = StringBuilder::new();
    let mut source_chunk_id = StringBuilder::new();
    for r in refs {
        ref_type.append_value(r.ref_type.as_str());
        ref_text.append_value(&r.ref_text);
        source_chunk_id.append_value(&r.source_chunk_id);
    }
    let columns: Vec<ArrayRef> = vec![
        Arc::new(ref_type.finish()),
        Arc::new(ref_text.finish()),
        Arc::new(source_chunk_id.finish()),
    ];
    Ok(RecordBatch::try_new(
        Arc::new(legal_references_schema()),
        columns,
    )?)
}

pub fn deadlines_batch(deadlines: &[Deadline]) -> Result<RecordBatch, RecordError> {
    let mut date_text = StringBuilder::new();
    let mut due_date = Date32Builder::new();
    let mut action = StringBuilder::new();
    let mut responsible_entity = StringBuilder::new();
    let mut source_text = StringBuilder::new();
    let mut source_chunk_id = StringBuilder::new();
    for d in deadlines {
        date_text.append_value(&d.date_text);
        due_date.append_option(d.due_date.map(Date32Type::from_naive_date));
        action.append_option(d.action.as_deref());
        responsible_entity.append_option(d.responsible_entity.as_deref());
        source_text.append_value(&d.source_text);
        source_chunk_id.append_value(&d.source_chunk_id);
    }
    let columns: Vec<ArrayRef> = vec![
        Arc::new(date_text.finish()),
        Arc::new(due_date.finish()),
        Arc::new(action.finish()),
        Arc::new(responsible_entity.finish()),
        Arc::new(source_text.finish()),
        Arc::new(source_chunk_id.finish()),
    ];
    Ok(RecordBatch::try_new(Arc::new(deadlines_schema()), columns)?)
}

pub fn pork_scores_batch(scores: &[PorkScore]) -> Result<RecordBatch, RecordError> {
    let mut funding_item_id = UInt64Builder::new();
    let mut heuristic = Float64Builder::new();
    let mut ai = Float64Builder::new();
    let mut blended = Float64Builder::new();
    let mut flags = ListBuilder::new(StringBuilder::new());
    let mut reasons = ListBuilder::new(StringBuilder::new());
    for s in scores {
        funding_item_id.append_value(s.funding_item_id as u64);
        heuristic.append_value(s.heuristic_score);
        ai.append_option(s.ai_score);
        blended.append_value(s.blended_score);
        for flag in &s.flags {
            flags.values().append_value(flag);
        }
        flags.append(true);
        for reason in &s.reasons {
            reasons.values().append_value(reason);
        }
        reasons.append(true);
    }
    let columns: Vec<ArrayRef> = vec![
        Arc::new(funding_item_id.finish()),
        Arc::new(heuristic.finish()),
        Arc::new(ai.finish()),
        Arc::new(blended.finish()),
        Arc::new(flags.finish()),
        Arc::new(reasons.finish()),
    ];
    Ok(RecordBatch::try_new(Arc::new(pork_scores_schema()), columns)?)
}

// ── Batches → records ──

/// Read funding items back from `funding_items` batches, e.g. to score a
/// bill whose extraction was persisted earlier.
pub fn funding_items_from_batches(
    batches: &[RecordBatch],
) -> Result<Vec<FundingItem>, RecordError> {
    let mut items = Vec::new();
    for batch in batches {
        let amount_text = string_column(batch, "amount_text")?;
        let amount_numeric = batch
            .column_by_name("amount_numeric")
            .ok_or(RecordError::MissingColumn("amount_numeric"))?
            .as_any()
            .downcast_ref::<Float64Array>()
            .ok_or(RecordError::ColumnType {
                column: "amount_numeric",
                expected: "Float64",
            })?;
        let purpose = string_column(batch, "purpose")?;
        let recipient = string_column(batch, "recipient")?;
        let availability = string_column(batch, "availability")?;
        let fiscal_years = batch
            .column_by_name("fiscal_years")
            .ok_or(RecordError::MissingColumn("fiscal_years"))?
            .as_any()
            .downcast_ref::<ListArray>()
            .ok_or(RecordError::ColumnType {
                column: "fiscal_years",
                expected: "List<Int32>",
            })?;
        let source_text = string_column(batch, "source_text")?;
        let source_chunk_id = string_column(batch, "source_chunk_id")?;

        for row in 0..batch.num_rows() {
            items.push(FundingItem {
                amount_text: required(amount_text, "amount_text", row)?,
                amount_numeric: (!amount_numeric.is_null(row)).then(|| amount_numeric.value(row)),
                purpose: optional(purpose, row),
                recipient: optional(recipient, row),
                availability: optional(availability, row),
                fiscal_years: int_list(fiscal_years, row),
                source_text: required(source_text, "source_text", row)?,
                source_chunk_id: required(source_chunk_id, "source_chunk_id", row)?,
            });
        }
    }
    Ok(items)
}

// ── Arrow helpers ──

fn string_column<'a>(
    batch: &'a RecordBatch,
    name: &'static str,
) -> Result<&'a StringArray, RecordError> {
    batch
        .column_by_name(name)
        .ok_or(RecordError::MissingColumn(name))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or(RecordError::ColumnType {
            column: name,
            expected: "Utf8",
        })
}

fn required(col: &StringArray, name: &'static str, row: usize) -> Result<String, RecordError> {
    optional(col, row).ok_or(RecordError::NullValue { column: name, row })
}

fn optional(col: &StringArray, row: usize) -> Option<String> {
    (!col.is_null(row)).then(|| col.value(row).to_string())
}

fn int_list(col: &ListArray, row: usize) -> Vec<i32> {
    if col.is_null(row) {
        return Vec::new();
    }
    let values = col.value(row);
    match values.as_any().downcast_ref::<Int32Array>() {
        Some(ints) => (0..ints.len())
            .filter(|&i| !ints.is_null(i))
            .map(|i| ints.value(i))
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::RefType;

    fn item(amount: Option<f64>, purpose: Option<&str>, years: &[i32]) -> FundingItem {
        FundingItem {
            amount_text: "$100,000,000".into(),
            amount_numeric: amount,
            purpose: purpose.map(String::from),
            recipient: None,
            availability: Some("until expended".into()),
            fiscal_years: years.to_vec(),
            source_text: "$100,000,000 for disaster relief".into(),
            source_chunk_id: "001_div_a".into(),
        }
    }

    #[test]
    fn funding_schema_has_expected_fields() {
        let schema = funding_items_schema();
        assert_eq!(schema.fields().len(), 8);
        assert!(schema.field_with_name("amount_numeric").unwrap().is_nullable());
        assert!(!schema.field_with_name("amount_text").unwrap().is_nullable());
    }

    #[test]
    fn funding_batch_preserves_nulls_and_lists() {
        let items = vec![
            item(Some(1e8), Some("disaster relief"), &[2025, 2026]),
            item(None, None, &[]),
        ];
        let batch = funding_items_batch(&items).unwrap();
        assert_eq!(batch.num_rows(), 2);

        let back = funding_items_from_batches(&[batch]).unwrap();
        assert_eq!(back, items);
    }

    #[test]
    fn funding_from_batches_reports_missing_column() {
        let batch = legal_references_batch(&[]).unwrap();
        let err = funding_items_from_batches(&[batch]).unwrap_err();
        assert!(matches!(err, RecordError::MissingColumn("amount_text")));
    }

    #[test]
    fn references_batch_uses_type_strings() {
        let refs = vec![LegalReference {
            ref_type: RefType::UsCode,
            ref_text: "42 U.S.C. 3030a".into(),
            source_chunk_id: "000".into(),
        }];
        let batch = legal_references_batch(&refs).unwrap();
        let col = batch
            .column_by_name("ref_type")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(col.value(0), "us_code");
    }

    #[test]
    fn deadlines_batch_encodes_date32() {
        let deadline = |date_text: &str, due_date| Deadline {
            date_text: date_text.into(),
            due_date,
            action: None,
            responsible_entity: None,
            source_text: String::new(),
            source_chunk_id: "000".into(),
        };
        let deadlines = vec![
            deadline("January 2, 1970", NaiveDate::from_ymd_opt(1970, 1, 2)),
            deadline("September 30, 2025", NaiveDate::from_ymd_opt(2025, 9, 30)),
            deadline("December 31, 1969", NaiveDate::from_ymd_opt(1969, 12, 31)),
        ];
        let batch = deadlines_batch(&deadlines).unwrap();
        let col = batch
            .column_by_name("due_date")
            .unwrap()
            .as_any()
            .downcast_ref::<arrow::array::Date32Array>()
            .unwrap();
        assert_eq!(col.value(0), 1);
        assert_eq!(col.value(1), 20_361);
        assert_eq!(col.value(2), -1);
        for (i, d) in deadlines.iter().enumerate() {
            assert_eq!(col.value_as_date(i), d.due_date);
        }
        assert!(batch.column_by_name("action").unwrap().is_null(0));
    }

    #[test]
    fn scores_batch_row_per_score() {
        let scores = vec![
            PorkScore::new(0, 40.0, Some(80.0), vec!["named_entity".into()], vec![]),
            PorkScore::new(1, 10.0, None, vec![], vec![]),
        ];
        let batch = pork_scores_batch(&scores).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert!(batch.column_by_name("ai_score").unwrap().is_null(1));
    }
}
