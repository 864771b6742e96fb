//! Base India Circle directory CLI
//!
//! Query the directory from a terminal, take project submissions, or serve
//! the directory as JSON.
//!
//! Run with: cargo run --bin circle -- <command>

use anyhow::{Context, Result};
use circle_directory::{
    data, db,
    intake::{self, Reply, SubmissionFlow, SubmissionStatus},
    Config, Directory, DirectoryError, FounderCard, ProjectFilter, ResolvedProject,
};
use percent_encoding::percent_decode_str;
use serde_json::json;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use url::Url;

const USAGE: &str = "\
Usage: circle <command>

  project <slug>              Show one project
  founder <handle>            Show a founder profile
  similar <handle>            Founders most like <handle>
  search [--category=C] [--batch=B] [--tag=T] [--winners] [query]
  founders [query]            List (or search) founders
  map                         Founder map markers
  categories                  Categories, sub-filters and batches
  submit                      Submit a project interactively
  submissions [status]        List stored submissions
  review <id> <status>        Mark a submission approved/rejected/pending
  --serve [--port=N]          Serve the directory as JSON

Add --json to any query command for JSON output.";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = Config::from_env()?;
    let json_output = args.iter().any(|a| a == "--json");

    let Some(command) = args.get(1) else {
        println!("{}", USAGE);
        return Ok(());
    };

    match command.as_str() {
        "project" => {
            let slug = args.get(2).context("Usage: circle project <slug>")?;
            run_project(&config, slug, json_output)
        }
        "founder" => {
            let handle = args.get(2).context("Usage: circle founder <handle>")?;
            run_founder(&config, handle, json_output)
        }
        "similar" => {
            let handle = args.get(2).context("Usage: circle similar <handle>")?;
            run_similar(&config, handle, json_output)
        }
        "search" => {
            let filter = parse_search_args(&args[2..]);
            run_search(&config, &filter, json_output)
        }
        "founders" => {
            let query = positional(&args[2..]).join(" ");
            run_founders(&config, &query, json_output)
        }
        "map" => run_map(&config, json_output),
        "categories" => run_categories(json_output),
        "submit" => run_submit(&config),
        "submissions" => {
            let status = match args.get(2).filter(|a| !a.starts_with("--")) {
                Some(s) => Some(
                    SubmissionStatus::parse(s)
                        .with_context(|| format!("Unknown status: {}", s))?,
                ),
                None => None,
            };
            run_submissions(&config, status, json_output)
        }
        "review" => {
            let usage = "Usage: circle review <id> <approved|rejected|pending>";
            let id = args.get(2).context(usage)?;
            let status = args
                .get(3)
                .and_then(|s| SubmissionStatus::parse(s))
                .context(usage)?;
            run_review(&config, id, status)
        }
        "--serve" => {
            let port: u16 = args
                .iter()
                .find(|a| a.starts_with("--port="))
                .and_then(|a| a.strip_prefix("--port=").and_then(|p| p.parse().ok()))
                .unwrap_or(config.port);
            run_http_server(&config, port).await
        }
        "help" | "--help" | "-h" => {
            println!("{}", USAGE);
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}\n\n{}", other, USAGE);
            std::process::exit(2);
        }
    }
}

fn positional(args: &[String]) -> Vec<&str> {
    args.iter()
        .filter(|a| !a.starts_with("--"))
        .map(String::as_str)
        .collect()
}

/// `--category=`, `--batch=` and `--tag=` (both repeatable), `--winners`,
/// everything else is the free-text query
fn parse_search_args(args: &[String]) -> ProjectFilter {
    let mut filter = ProjectFilter::new();
    for arg in args {
        if let Some(c) = arg.strip_prefix("--category=") {
            filter = filter.category(c);
        } else if let Some(b) = arg.strip_prefix("--batch=") {
            filter = filter.batch(b);
        } else if let Some(t) = arg.strip_prefix("--tag=") {
            filter = filter.sub_tag(t);
        } else if arg == "--winners" {
            filter = filter.winners_only(true);
        }
    }
    filter.query(&positional(args).join(" "))
}

/// Print not-found as a message rather than failing the process
fn report_missing(err: DirectoryError, json_output: bool) -> Result<()> {
    if !err.is_not_found() {
        return Err(err.into());
    }
    if json_output {
        println!("{}", serde_json::to_string_pretty(&json!({"error": err.to_string()}))?);
    } else {
        eprintln!("✗ {}", err);
    }
    Ok(())
}

fn print_project_line(resolved: &ResolvedProject) {
    let p = &resolved.project;
    let founders: Vec<String> = p.founders.iter().map(|f| format!("@{}", f.handle)).collect();
    let trophy = if p.is_winner() { " 🏆" } else { "" };
    println!(
        "  {:<14} {:<12} {:<20} {}{}",
        p.name,
        p.category,
        p.batch,
        founders.join(", "),
        trophy
    );
}

fn print_card_line(card: &FounderCard) {
    println!(
        "  {:<20} @{:<16} {:<12} {}",
        card.name,
        card.handle,
        card.city.as_deref().unwrap_or("-"),
        card.project
    );
}

fn run_project(config: &Config, slug: &str, json_output: bool) -> Result<()> {
    let directory = Directory::from_config(config)?;
    let resolved = match directory.project(slug) {
        Ok(r) => r,
        Err(e) => return report_missing(e, json_output),
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(());
    }

    let p = &resolved.project;
    println!("\n{} ({})", p.name, p.key());
    println!("{}", "─".repeat(60));
    println!("Category:  {}", p.category);
    println!("Batch:     {}", p.batch);
    if !p.url.is_empty() {
        println!("Link:      {}", p.url);
    }
    for founder in &p.founders {
        println!("Founder:   {} (@{})", founder.name, founder.handle);
    }
    if !p.tags.is_empty() {
        println!("Tags:      {}", p.tags.join(", "));
    }
    if p.is_winner() {
        println!("Prizes:    {}", p.prizes.join(", "));
    }
    println!("\n{}", p.description);
    if let Some(content) = &resolved.content {
        println!("\n{}", content);
    }
    Ok(())
}

fn run_founder(config: &Config, handle: &str, json_output: bool) -> Result<()> {
    let directory = Directory::from_config(config)?;
    let profile = match directory.founder(handle) {
        Ok(p) => p,
        Err(e) => return report_missing(e, json_output),
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    println!("\n{} (@{})", profile.name, profile.handle);
    println!("{}", "─".repeat(60));
    let place: Vec<&str> = [profile.city.as_deref(), profile.country.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if !place.is_empty() {
        println!("From:      {}", place.join(", "));
    }
    if let Some(bio) = &profile.short_bio {
        println!("Bio:       {}", bio);
    }
    let m = &profile.metrics;
    println!("Projects:  {}", m.projects_built);
    println!("Hackathons:{:>2}", m.hackathons_attended);
    println!("Prizes:    {}", m.prizes_won);
    if m.prize_winnings_amount > 0.0 {
        println!("Winnings:  ${:.0}", m.prize_winnings_amount);
    }
    if !profile.tags.is_empty() {
        println!("Tags:      {}", profile.tags.join(", "));
    }
    if !profile.projects.is_empty() {
        println!("Built:     {}", profile.projects.join(", "));
    }
    if !profile.content.is_empty() {
        println!("\n{}", profile.content);
    }
    Ok(())
}

fn run_similar(config: &Config, handle: &str, json_output: bool) -> Result<()> {
    let directory = Directory::from_config(config)?;
    let matches = match directory.similar_founders(handle) {
        Ok(m) => m,
        Err(e) => return report_missing(e, json_output),
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    println!("\nFounders like @{}:", handle);
    for m in &matches {
        print!("  [{:>2}]", m.score);
        print_card_line(&m.item);
    }
    Ok(())
}

fn run_search(config: &Config, filter: &ProjectFilter, json_output: bool) -> Result<()> {
    let directory = Directory::from_config(config)?;
    let found = directory.projects(filter);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&found)?);
        return Ok(());
    }

    println!("\n{} project(s)", found.len());
    for resolved in &found {
        print_project_line(resolved);
    }
    Ok(())
}

fn run_founders(config: &Config, query: &str, json_output: bool) -> Result<()> {
    let directory = Directory::from_config(config)?;
    let cards = directory.search_founders(query);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&cards)?);
        return Ok(());
    }

    println!("\n{} founder(s)", cards.len());
    for card in &cards {
        print_card_line(card);
    }
    Ok(())
}

fn run_map(config: &Config, json_output: bool) -> Result<()> {
    let directory = Directory::from_config(config)?;
    let markers = directory.markers();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&markers)?);
        return Ok(());
    }

    let mut current_group = None;
    for marker in &markers {
        if current_group != Some(marker.group) {
            println!("\n📍 {}", marker.city);
            current_group = Some(marker.group);
        }
        println!(
            "  @{:<16} ({:.4}, {:.4})  svg ({:.1}, {:.1})",
            marker.handle, marker.lat, marker.lng, marker.x, marker.y
        );
    }
    Ok(())
}

fn run_categories(json_output: bool) -> Result<()> {
    let taxonomy = data::taxonomy();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&taxonomy)?);
        return Ok(());
    }

    println!("\nCategories:");
    for category in &taxonomy.categories {
        println!("  {:<12} {}", category.name, category.sub_filters.join(", "));
    }
    println!("\nBatches:");
    for batch in taxonomy.batches {
        println!("  {}", batch);
    }
    Ok(())
}

/// Interactive intake on stdin; one stored row per completed flow
fn run_submit(config: &Config) -> Result<()> {
    use std::io::{self, BufRead, Write};

    let conn = db::init_db(&config.db_path)?;
    let submitted_by = std::env::var("USER").ok().map(|u| format!("cli:{}", u));
    let mut flow = SubmissionFlow::new(submitted_by.clone());

    println!("{}\n", intake::WELCOME);
    println!("{}", flow.prompt());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    print!("> ");
    stdout.flush()?;

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().eq_ignore_ascii_case(intake::CANCEL) {
            flow = SubmissionFlow::new(submitted_by.clone());
            println!("Cancelled. Starting over.\n{}", flow.prompt());
        } else {
            match flow.answer(&line) {
                Reply::Next(prompt) => println!("{}", prompt),
                Reply::Retry(message) => println!("✗ {}", message),
                Reply::Done(submission) => {
                    db::insert_submission(&conn, &submission)?;
                    tracing::info!(id = %submission.id, "submission stored");
                    println!(
                        "✓ Thanks! {} is queued for review (id {}).",
                        submission.product_name, submission.id
                    );
                    return Ok(());
                }
            }
        }
        print!("> ");
        stdout.flush()?;
    }

    println!("\nNo submission stored.");
    Ok(())
}

fn run_submissions(
    config: &Config,
    status: Option<SubmissionStatus>,
    json_output: bool,
) -> Result<()> {
    let conn = db::init_db(&config.db_path)?;
    let submissions = db::list_submissions(&conn, status)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&submissions)?);
        return Ok(());
    }

    for (status, count) in db::count_by_status(&conn)? {
        println!("{:<10} {}", status, count);
    }
    println!();
    for s in &submissions {
        println!(
            "  {}  {:<9} {:<20} @{:<16} {}",
            s.created_at.format("%Y-%m-%d %H:%M"),
            s.status.as_str(),
            s.product_name,
            s.founder_twitter,
            s.project_url
        );
    }
    Ok(())
}

fn run_review(config: &Config, id: &str, status: SubmissionStatus) -> Result<()> {
    let conn = db::init_db(&config.db_path)?;
    if db::set_status(&conn, id, status)? {
        println!("✓ {} is now {}", id, status.as_str());
    } else {
        eprintln!("✗ No submission with id {}", id);
    }
    Ok(())
}

// =============================================================================
// HTTP
// =============================================================================

#[derive(Debug, PartialEq)]
struct Response {
    status: u16,
    body: serde_json::Value,
}

impl Response {
    fn ok<T: serde::Serialize>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Self { status: 200, body },
            Err(e) => Self::error(500, &e.to_string()),
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }),
        }
    }

    fn from_result<T: serde::Serialize>(result: Result<T, DirectoryError>) -> Self {
        match result {
            Ok(value) => Self::ok(&value),
            Err(e) if e.is_not_found() => Self::error(404, &e.to_string()),
            Err(e) => Self::error(500, &e.to_string()),
        }
    }

    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            _ => "Internal Server Error",
        }
    }
}

/// Filter from `?category=&batch=&tag=&winners=&q=`
fn filter_from_query(url: &Url) -> ProjectFilter {
    let mut filter = ProjectFilter::new();
    for (key, value) in url.query_pairs() {
        filter = match &*key {
            "category" => filter.category(&value),
            "batch" => filter.batch(&value),
            "tag" => filter.sub_tag(&value),
            "winners" => filter.winners_only(value == "1" || value == "true"),
            "q" => filter.query(&value),
            _ => filter,
        };
    }
    filter
}

/// Map one request onto the directory
fn route(directory: &Directory, method: &str, target: &str) -> Response {
    if method != "GET" {
        return Response::error(405, &format!("Method not allowed: {}", method));
    }

    let Ok(url) = Url::parse(&format!("http://localhost{}", target)) else {
        return Response::error(400, &format!("Bad request target: {}", target));
    };
    let segments: Vec<String> = url
        .path_segments()
        .map(|s| {
            s.filter(|seg| !seg.is_empty())
                .map(|seg| percent_decode_str(seg).decode_utf8_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

    match segments.as_slice() {
        ["projects"] => Response::ok(&directory.projects(&filter_from_query(&url))),
        ["projects", slug] => Response::from_result(directory.project(slug)),
        ["projects", slug, "similar"] => Response::from_result(directory.similar_projects(slug)),
        ["founders"] => {
            let query = url
                .query_pairs()
                .find(|(k, _)| k == "q")
                .map(|(_, v)| v.into_owned())
                .unwrap_or_default();
            Response::ok(&directory.search_founders(&query))
        }
        ["founders", handle] => Response::from_result(directory.founder(handle)),
        ["founders", handle, "similar"] => {
            Response::from_result(directory.similar_founders(handle))
        }
        ["map"] => Response::ok(&directory.markers()),
        ["categories"] => Response::ok(&data::taxonomy()),
        _ => Response::error(404, &format!("Not found: {}", url.path())),
    }
}

/// HTTP server mode: read-only JSON over the directory
async fn run_http_server(config: &Config, port: u16) -> Result<()> {
    use tokio::net::TcpListener;

    let directory = Arc::new(Directory::from_config(config)?);

    let listener = TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    tracing::info!("Listening on http://localhost:{}", port);

    loop {
        let (stream, peer) = listener.accept().await?;
        let directory = Arc::clone(&directory);

        tokio::spawn(async move {
            if let Err(e) = handle_http_request(stream, &directory).await {
                tracing::warn!(%peer, error = %e, "request failed");
            }
        });
    }
}

async fn handle_http_request(stream: tokio::net::TcpStream, directory: &Directory) -> Result<()> {
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;

    // Drain headers; requests carry no body we care about
    loop {
        let mut header = String::new();
        let n = reader.read_line(&mut header).await?;
        if n == 0 || header.trim().is_empty() {
            break;
        }
    }

    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("");
    let target = parts.next().unwrap_or("/");

    let response = route(directory, method, target);
    tracing::debug!(method, target, status = response.status, "request");

    let response_str = serde_json::to_string(&response.body)?;
    let http = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nAccess-Control-Allow-Origin: *\r\nConnection: close\r\n\r\n{}",
        response.status,
        response.reason(),
        response_str.len(),
        response_str
    );

    write_half.write_all(http.as_bytes()).await?;
    write_half.flush().await?;

    Ok(())
}
