//! Basic usage example for the hal-search library.
//!
//! Searches HAL for papers about Python submitted between 2012 and 2019 and
//! saves the raw JSON body to `result.json`.

use hal_search::client::HalClient;
use hal_search::models::SearchParams;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let client = HalClient::builder().build()?;
    println!("Searching {}", client.endpoint());

    let params = SearchParams::new("python")
        .include_fields(["docid", "label_s", "abstract_s"])
        .before(2019)
        .after(2012)
        .rows(100)
        .offset(0);

    let response = client.search(&params).await?;
    println!("Requested {}", response.url());

    let body = response.text().await?;
    std::fs::write("result.json", &body)?;
    println!("Wrote {} bytes to result.json", body.len());

    Ok(())
}
