//! Non-storage listing commands.
//!
//! Each is a single authenticated GET whose JSON body is pretty-printed to
//! stdout. No retries, no state; failures surface directly.

use anyhow::Context;
use gcl_auth::TokenSupplier;

const BOOKMARKS_URL: &str = "https://www.google.com/bookmarks/lookup?output=json";
const CONTACTS_URL: &str =
    "https://people.googleapis.com/v1/people/me/connections?personFields=names,emailAddresses";
const BOOKS_URL: &str = "https://www.googleapis.com/books/v1/mylibrary/bookshelves";
const PHOTOS_URL: &str = "https://photoslibrary.googleapis.com/v1/albums";

pub async fn list_bookmarks(supplier: &dyn TokenSupplier) -> anyhow::Result<()> {
    print_feed(supplier, BOOKMARKS_URL, "bookmarks").await
}

pub async fn list_contacts(supplier: &dyn TokenSupplier) -> anyhow::Result<()> {
    print_feed(supplier, CONTACTS_URL, "contacts").await
}

pub async fn list_books(supplier: &dyn TokenSupplier) -> anyhow::Result<()> {
    print_feed(supplier, BOOKS_URL, "books").await
}

pub async fn list_photos(supplier: &dyn TokenSupplier) -> anyhow::Result<()> {
    print_feed(supplier, PHOTOS_URL, "photos").await
}

async fn print_feed(
    supplier: &dyn TokenSupplier,
    url: &str,
    what: &str,
) -> anyhow::Result<()> {
    let token = supplier.current().await?;

    let body: serde_json::Value = reqwest::Client::new()
        .get(url)
        .bearer_auth(&token.token)
        .send()
        .await
        .with_context(|| format!("{what} request failed"))?
        .error_for_status()
        .with_context(|| format!("{what} listing rejected"))?
        .json()
        .await
        .with_context(|| format!("{what} response was not JSON"))?;

    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
