#![cfg(not(tarpaulin_include))]

use clap::Parser;
use std::io::{self, Read};
use std::path::Path;

use tablefill::config::ClientConfig;
use tablefill::grid::Grid;
use tablefill::paste::distribute;
use tablefill::submit::{Page, SelectedFile, SubmitError, TransferResult};
use tablefill::transport::HttpTransport;

fn read_paste(source: &str) -> io::Result<String> {
    if source == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        std::fs::read_to_string(source)
    }
}

fn content_type_for(path: &Path) -> Option<&'static str> {
    match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
        "xlsx" => Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        "xls" => Some("application/vnd.ms-excel"),
        "csv" => Some("text/csv"),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let config = ClientConfig::parse();

    let mut page = Page::new(Grid::create(config.rows, config.cols)?);

    if let Some(source) = &config.paste {
        let text = read_paste(source)?;
        let written = distribute(&mut page.grid, Some(&text), config.anchor);
        println!(
            "Pasted {} cell(s) at row {}, column {}",
            written, config.anchor.row, config.anchor.col
        );
    }

    if let Some(path) = &config.file {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut file = SelectedFile::new(name, std::fs::read(path)?);
        if let Some(content_type) = content_type_for(path) {
            file = file.with_content_type(content_type);
        }
        page.select_file(file);
    }

    if page.grid.is_blank() {
        log::warn!("submitting an empty grid");
    }

    let transport = HttpTransport::new(config.endpoint.as_str())?;
    log::info!("sending to {}", transport.endpoint());
    let outcome = page.process_data(&transport).await;
    match outcome {
        Err(SubmitError::NoFileSelected) => {
            eprintln!("{}", page.ui.prompt.as_deref().unwrap_or_default());
            std::process::exit(2);
        }
        Err(e) => return Err(e.into()),
        Ok(TransferResult::Failure(message)) => {
            eprintln!("{}", message);
            std::process::exit(1);
        }
        Ok(TransferResult::Success(link)) => {
            let bytes = page.download_bytes().unwrap_or_default();
            let target = config.out_dir.join(&link.filename);
            std::fs::write(&target, bytes)?;
            println!("{}", page.ui.status);
            println!("Saved {} ({} bytes)", target.display(), bytes.len());
        }
    }

    Ok(())
}
