use crate::types::MagicNumber;

pub const STORE_FORMAT_VERSION: &str = "1";

pub const SCHEMA: &str = r#"
-- Store-level key/value information
CREATE TABLE sqlbundle (
    field TEXT,
    value TEXT
);

-- Every bundled file, namespace directory and resource
CREATE TABLE code (
    fullname TEXT,
    path TEXT,
    is_package BOOLEAN,
    contents BLOB  -- raw DEFLATE
);

CREATE INDEX fullname_index ON code (fullname);

-- A row here means bytecode_<magic_number> is complete
CREATE TABLE magic_numbers (
    magic_number INTEGER UNIQUE,
    python_identifier TEXT
);
"#;

pub fn compiled_table(magic: MagicNumber) -> String {
    let table = magic.table_name();
    format!(
        r#"
CREATE TABLE {table} (
    fullname TEXT,
    path TEXT,
    is_package BOOLEAN,
    contents BLOB
);

CREATE INDEX {table}_fullname_index ON {table} (fullname);
"#
    )
}
