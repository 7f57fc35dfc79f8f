use crate::api::models::{QueryRequest, SearchResponse};
use crate::{Error, Result};
use reqwest::Client;

/// Search recipe names on a running server
pub async fn search(server_url: &str, query: &str) -> Result<()> {
    let client = Client::new();

    let url = format!("{server_url}/search-names/");
    let response = client
        .post(&url)
        .json(&QueryRequest {
            query: query.to_string(),
        })
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        return Err(Error::Internal(format!(
            "Server returned HTTP {status}: {detail}"
        )));
    }

    let results: SearchResponse = response.json().await?;

    // Display results
    print_names(&results.names);

    Ok(())
}

fn print_names(names: &[String]) {
    if names.is_empty() {
        println!("No matching recipes found");
        return;
    }

    println!("\nFound {} recipes:\n", names.len());
    for (position, name) in names.iter().enumerate() {
        println!("{:>3}. {}", position + 1, name);
    }
}
