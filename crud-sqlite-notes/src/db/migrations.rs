use lazy_static::lazy_static;
use rusqlite_migration::{Migrations, M};

lazy_static! {
    pub static ref MIGRATIONS: Migrations<'static> = Migrations::new(vec![
        M::up(r#"
                CREATE TABLE notes (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    slug TEXT NOT NULL UNIQUE,
                    title TEXT NOT NULL,
                    content TEXT NOT NULL DEFAULT '',
                    date DATETIME NOT NULL,
                    labels TEXT NOT NULL DEFAULT '[]'
                );
                "#
        ),
        M::up("CREATE INDEX notes_date_idx ON notes (date DESC);"),
    ]);
}
