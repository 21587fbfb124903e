use std::error::Error;

use clap::Parser;
use itertools::Itertools;
use num_format::{Locale, ToFormattedString};
use simple_logger::SimpleLogger;

use s3_table::{LocalDisk, S3Config, StorageFetcher, Table};

const ABOUT: &'static str = r#"Fetches a CSV object and prints a summary of it.
The bucket and credentials are read from `S3_BUCKET_NAME`, `AWS_ACCESS_KEY` and `AWS_SECRET_KEY`
(a `.env` file in the current directory is loaded first).
"#;

#[derive(Parser, Debug)]
#[command(author, version, about = ABOUT)]
struct Cli {
    /// The key of the object (e.g. `data/data.csv`)
    #[arg(long)]
    key: String,
    /// Read the key as a path on the local disk instead
    #[arg(long, default_value_t = false)]
    local: bool,
    /// The number of records to print
    #[arg(long, default_value_t = 5)]
    head: usize,
}

fn summary(table: &Table, head: usize) -> Result<(), Box<dyn Error>> {
    println!(
        "Data fetched with {} records",
        table.num_rows().to_formatted_string(&Locale::en)
    );
    println!(
        "Columns: {}",
        table
            .schema()
            .iter()
            .map(|field| format!("{} ({:?})", field.name, field.data_type))
            .join(", ")
    );
    let records = serde_json::to_value(table)?;
    if let Some(records) = records.as_array() {
        for record in records.iter().take(head) {
            println!("{record}");
        }
    }
    Ok(())
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .unwrap();

    let cli = Cli::parse();

    let table = if cli.local {
        StorageFetcher::with_provider(LocalDisk)
            .fetch_object(&cli.key)
            .await
    } else {
        dotenvy::dotenv().ok();
        StorageFetcher::new(S3Config::from_env())
            .await
            .fetch_object(&cli.key)
            .await
    };

    let Some(table) = table else {
        return Err(format!("could not fetch '{}'", cli.key).into());
    };
    summary(&table, cli.head)
}
