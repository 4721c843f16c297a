/// Key-value schema.
///
/// Uses CREATE TABLE IF NOT EXISTS for idempotent execution.
pub const KV_SCHEMA: &str = r#"
-- One JSON document per collection key
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
);
"#;
