//! CLI command handlers.
//!
//! Each `run_*` function performs one user action against an [`App`] and
//! prints the result to stdout. Errors bubble up to `main`, which prints
//! them and exits non-zero.

use anyhow::Result;
use chrono::DateTime;
use tokio_util::sync::CancellationToken;

use gamerteca_core::models::{CatalogRecord, GameList, GameStatus, LibraryEntry};
use gamerteca_core::query::Category;

use crate::app::App;

pub async fn run_popular(app: &App, refresh: bool, cancel: &CancellationToken) -> Result<()> {
    let records = app.catalog.get_popular(refresh, cancel).await?;
    print_records("popular", &records);
    Ok(())
}

pub async fn run_get(app: &App, id: i64, cancel: &CancellationToken) -> Result<()> {
    let record = app.catalog.get_record_by_id(id, cancel).await?;
    print_record(&record);
    Ok(())
}

pub async fn run_related(app: &App, id: i64, cancel: &CancellationToken) -> Result<()> {
    let records = app.catalog.get_related(id, cancel).await?;
    print_records(&format!("related to {}", id), &records);
    Ok(())
}

pub async fn run_browse(app: &App, category: Category, cancel: &CancellationToken) -> Result<()> {
    let label = category.label();
    let records = app.catalog.get_by_category(category, cancel).await?;
    print_records(&label, &records);
    Ok(())
}

pub async fn run_search(app: &App, text: &str, cancel: &CancellationToken) -> Result<()> {
    let records = app.catalog.search(text, cancel).await?;
    print_records(&format!("search \"{}\"", text), &records);
    Ok(())
}

pub async fn run_recent(app: &App, limit: usize) -> Result<()> {
    let records = app.catalog.get_recent(limit).await?;
    print_records("recent", &records);
    Ok(())
}

pub async fn run_cache_stats(app: &App) -> Result<()> {
    let count = app.catalog.cache().count().await?;
    println!("cached games: {}", count);
    Ok(())
}

pub async fn run_cache_clear(app: &App) -> Result<()> {
    app.catalog.clear_cache().await?;
    println!("cache cleared");
    Ok(())
}

// ── Library ────────────────────────────────────────────────────────────

pub async fn run_library_show(
    app: &App,
    status: Option<GameStatus>,
    favorites: bool,
) -> Result<()> {
    let entries = if favorites {
        app.library.favorites().await?
    } else {
        app.library.entries(status).await?
    };
    println!("library of {} ({} games)", app.library.user(), entries.len());
    for entry in &entries {
        print_entry(app, entry).await?;
    }
    Ok(())
}

pub async fn run_library_status(app: &App, game_id: i64, status: GameStatus) -> Result<()> {
    let entry = app.library.set_status(game_id, status).await?;
    print_entry(app, &entry).await
}

pub async fn run_library_favorite(app: &App, game_id: i64) -> Result<()> {
    let entry = app.library.toggle_favorite(game_id).await?;
    print_entry(app, &entry).await
}

pub async fn run_library_rate(app: &App, game_id: i64, rating: Option<u8>) -> Result<()> {
    let entry = app.library.set_rating(game_id, rating).await?;
    print_entry(app, &entry).await
}

pub async fn run_library_remove(app: &App, game_id: i64) -> Result<()> {
    app.library.remove(game_id).await?;
    println!("removed {} from library", game_id);
    Ok(())
}

// ── Lists ──────────────────────────────────────────────────────────────

pub async fn run_list_create(
    app: &App,
    name: &str,
    description: Option<String>,
    public: bool,
) -> Result<()> {
    let list = app.library.create_list(name, description, public).await?;
    println!("created list {}", list.id);
    print_list(app, &list).await
}

pub async fn run_list_show(app: &App, list_id: &str) -> Result<()> {
    let list = app.library.list(list_id).await?;
    print_list(app, &list).await
}

pub async fn run_list_add(app: &App, list_id: &str, game_id: i64) -> Result<()> {
    let list = app.library.add_to_list(list_id, game_id).await?;
    print_list(app, &list).await
}

pub async fn run_list_remove(app: &App, list_id: &str, game_id: i64) -> Result<()> {
    let list = app.library.remove_from_list(list_id, game_id).await?;
    print_list(app, &list).await
}

pub async fn run_list_share(app: &App, list_id: &str, public: bool) -> Result<()> {
    let list = app.library.set_list_visibility(list_id, public).await?;
    println!(
        "list {} is now {}",
        list.id,
        if list.public { "public" } else { "private" }
    );
    Ok(())
}

pub async fn run_list_delete(app: &App, list_id: &str) -> Result<()> {
    app.library.delete_list(list_id).await?;
    println!("deleted list {}", list_id);
    Ok(())
}

pub async fn run_list_index(app: &App, public: bool) -> Result<()> {
    let lists = if public {
        app.library.public_lists().await?
    } else {
        app.library.lists().await?
    };
    for list in &lists {
        println!(
            "{}  {}  ({} games, {}, owner {})",
            list.id,
            list.name,
            list.game_ids.len(),
            if list.public { "public" } else { "private" },
            list.owner
        );
    }
    if lists.is_empty() {
        println!("no lists");
    }
    Ok(())
}

// ── Rendering ──────────────────────────────────────────────────────────

fn format_date(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| ts.to_string())
}

fn format_rating(rating: Option<f64>) -> String {
    rating
        .map(|r| format!("{:.0}", r))
        .unwrap_or_else(|| "-".to_string())
}

fn print_records(label: &str, records: &[CatalogRecord]) {
    println!("{} ({} games)", label, records.len());
    for r in records {
        let year = r
            .release_year()
            .map(|y| y.to_string())
            .unwrap_or_else(|| "????".to_string());
        println!(
            "{:>8}  {}  [{}]  rating {}",
            r.id,
            r.name,
            year,
            format_rating(r.rating)
        );
    }
}

fn print_record(r: &CatalogRecord) {
    println!("--- Game ---");
    println!("id:           {}", r.id);
    println!("name:         {}", r.name);
    println!("rating:       {}", format_rating(r.rating));
    if let Some(ts) = r.release_date {
        println!("released:     {}", format_date(ts));
    }
    if !r.genres.is_empty() {
        println!("genres:       {}", r.genres.join(", "));
    }
    if !r.platforms.is_empty() {
        println!("platforms:    {}", r.platforms.join(", "));
    }
    if !r.developers.is_empty() {
        println!("developers:   {}", r.developers.join(", "));
    }
    if let Some(ref url) = r.cover_url {
        println!("cover:        {}", url);
    }
    for url in &r.screenshot_urls {
        println!("screenshot:   {}", url);
    }
    if !r.related_ids.is_empty() {
        let ids: Vec<String> = r.related_ids.iter().map(|id| id.to_string()).collect();
        println!("related:      {}", ids.join(", "));
    }
    if let Some(ref summary) = r.summary {
        println!();
        println!("{}", summary);
    }
}

/// Library rows show the cached title when there is one; the cache is
/// never refreshed from here.
async fn cached_name(app: &App, game_id: i64) -> Result<String> {
    Ok(app
        .catalog
        .cache()
        .get_by_id(game_id)
        .await?
        .map(|r| r.name)
        .unwrap_or_else(|| "(not cached)".to_string()))
}

async fn print_entry(app: &App, entry: &LibraryEntry) -> Result<()> {
    let name = cached_name(app, entry.game_id).await?;
    println!(
        "{:>8}  {}  status {}{}{}",
        entry.game_id,
        name,
        entry.status.as_str(),
        if entry.favorite { "  ★" } else { "" },
        entry
            .rating
            .map(|r| format!("  my rating {}/10", r))
            .unwrap_or_default()
    );
    Ok(())
}

async fn print_list(app: &App, list: &GameList) -> Result<()> {
    println!(
        "--- {} ({}) ---",
        list.name,
        if list.public { "public" } else { "private" }
    );
    if let Some(ref description) = list.description {
        println!("{}", description);
    }
    for game_id in &list.game_ids {
        println!("{:>8}  {}", game_id, cached_name(app, *game_id).await?);
    }
    Ok(())
}
