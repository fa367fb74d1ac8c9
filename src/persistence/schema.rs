use sqlx::PgPool;

/// Create the accounts and transfers tables if they do not exist
///
/// Statements are idempotent and run in order on every startup.
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Initializing PostgreSQL schema...");

    for (name, ddl) in SCHEMA_STATEMENTS {
        sqlx::query(ddl).execute(pool).await.map_err(|e| {
            tracing::error!("Failed to apply schema statement '{}': {}", name, e);
            e
        })?;
    }

    tracing::info!("PostgreSQL schema ready");
    Ok(())
}

/// Named DDL statements, applied in order
pub const SCHEMA_STATEMENTS: &[(&str, &str)] = &[
    ("accounts", CREATE_ACCOUNTS_TABLE),
    ("transfers", CREATE_TRANSFERS_TABLE),
    ("transfers_origin_idx", CREATE_TRANSFERS_ORIGIN_INDEX),
    ("transfers_destination_idx", CREATE_TRANSFERS_DESTINATION_INDEX),
];

// `seq` fixes insertion order for listings; ids are random strings.
const CREATE_ACCOUNTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    seq          BIGSERIAL    NOT NULL,
    id           TEXT         PRIMARY KEY,
    name         TEXT         NOT NULL,
    tax_id       TEXT         NOT NULL UNIQUE CHECK (char_length(tax_id) = 11),
    secret_hash  TEXT         NOT NULL,
    balance      BIGINT       NOT NULL CHECK (balance >= 0),
    created_at   TIMESTAMPTZ  NOT NULL DEFAULT NOW()
)
"#;

const CREATE_TRANSFERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS transfers (
    seq                     BIGSERIAL    NOT NULL,
    id                      TEXT         PRIMARY KEY,
    account_origin_id       TEXT         NOT NULL REFERENCES accounts (id),
    account_destination_id  TEXT         NOT NULL REFERENCES accounts (id),
    amount                  BIGINT       NOT NULL CHECK (amount > 0),
    created_at              TIMESTAMPTZ  NOT NULL DEFAULT NOW(),
    CHECK (account_origin_id <> account_destination_id)
)
"#;

const CREATE_TRANSFERS_ORIGIN_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS transfers_origin_idx ON transfers (account_origin_id, seq)
"#;

const CREATE_TRANSFERS_DESTINATION_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS transfers_destination_idx ON transfers (account_destination_id, seq)
"#;
