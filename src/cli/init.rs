use std::path::PathBuf;

use tally::db::{get_connection, init_db};
use tally::error::Result;
use tally::settings::{load_settings, save_settings, shellexpand_path, DB_FILENAME};

pub fn run(data_dir: Option<String>, cash_account: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    if let Some(name) = cash_account {
        settings.cash_account = name;
    }
    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&resolved)?;

    let conn = get_connection(&resolved.join(DB_FILENAME))?;
    init_db(&conn)?;

    println!("Initialized tally at {}", resolved.display());
    println!("Cash account: {}", settings.cash_account);
    Ok(())
}
