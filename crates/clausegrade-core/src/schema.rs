/// Arrow schema and builder for the per-clause tabular record consumed by the batch pipeline.
pub mod records {
    use arrow::array::{ArrayRef, BooleanArray, StringArray, UInt8Array, UInt64Array};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::error::ArrowError;
    use arrow::record_batch::RecordBatch;
    use std::sync::Arc;

    use crate::analysis::Clause;

    /// Columns: `clause_id, text, is_risky, risk_reason, risk_score`.
    pub fn clause_record_schema() -> Schema {
        Schema::new(vec![
            Field::new("clause_id", DataType::UInt64, false),
            Field::new("text", DataType::Utf8, false),
            Field::new("is_risky", DataType::Boolean, false),
            Field::new("risk_reason", DataType::Utf8, false),
            Field::new("risk_score", DataType::UInt8, false),
        ])
    }

    /// One row per clause, in document order. `risk_reason` joins the sorted
    /// categories with `", "` and is empty for non-risky clauses.
    pub fn clause_records(clauses: &[Clause]) -> Result<RecordBatch, ArrowError> {
        let ids = UInt64Array::from_iter_values(clauses.iter().map(|c| c.sequence_number as u64));
        let texts = StringArray::from_iter_values(clauses.iter().map(|c| c.raw_text.as_str()));
        let risky = BooleanArray::from(clauses.iter().map(|c| c.is_risky).collect::<Vec<_>>());
        let reasons = StringArray::from_iter_values(clauses.iter().map(Clause::risk_reason));
        let scores = UInt8Array::from_iter_values(clauses.iter().map(|c| c.score));

        let columns: Vec<ArrayRef> = vec![
            Arc::new(ids),
            Arc::new(texts),
            Arc::new(risky),
            Arc::new(reasons),
            Arc::new(scores),
        ];

        RecordBatch::try_new(Arc::new(clause_record_schema()), columns)
    }
}
