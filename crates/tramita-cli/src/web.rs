//! Web view: the report as an HTML table plus a CSV download.
//!
//! Requests are handled one at a time on the calling thread. Each page load
//! rebuilds the report through the pipeline, whose lookup cache keeps repeat
//! loads within the cache window off the network.

use std::io::Cursor;
use std::net::SocketAddr;

use anyhow::anyhow;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use tiny_http::{Header, Method, Request, Response, Server};
use tokio::runtime::Runtime;
use tracing::{debug, error, info, warn};
use tramita_core::TRACKED_SEEDS;
use tramita_report::{CSV_FILE_NAME, Pipeline, Report, ReportError, to_csv};
use tramita_sync::ProposalSource;

const PAGE_TITLE: &str = "Legislative proposal monitor";
const HEADING: &str = "Selected legislative proposals in the Chamber of Deputies";
const BANNER: &str = "The search uses the open-data bases of the Chamber of Deputies and covers \
    the legislative proposals selected for monitoring. Results follow the updates of the \
    queried bases.";
const EMPTY_NOTICE: &str = "No proposals were loaded from the API.";

const STYLE: &str = "body{font-family:sans-serif;margin:2em}\
    .banner{color:#666;background:#f0f0f0;padding:10px;border-radius:5px;margin-bottom:20px}\
    h1{text-align:center;color:#555;font-size:1.3em;font-weight:normal}\
    .scroll{max-height:500px;overflow:auto;border:1px solid #ddd}\
    table{border-collapse:collapse;font-size:0.85em}\
    th{position:sticky;top:0;background:#fafafa}\
    th,td{border:1px solid #ddd;padding:4px 8px;vertical-align:top}\
    td{white-space:pre-wrap}";

type Body = Response<Cursor<Vec<u8>>>;

#[derive(Debug, PartialEq, Eq)]
enum Route {
    Page,
    Csv,
    NotFound,
}

fn route(method: &Method, url: &str) -> Route {
    let path = url.split('?').next().unwrap_or(url);
    match (method, path) {
        (Method::Get, "/") => Route::Page,
        (Method::Get, p) if p.strip_prefix('/') == Some(CSV_FILE_NAME) => Route::Csv,
        _ => Route::NotFound,
    }
}

/// Serve the report on `addr` until the process is stopped.
pub fn serve<S: ProposalSource>(
    addr: SocketAddr,
    runtime: &Runtime,
    pipeline: &Pipeline<S>,
) -> anyhow::Result<()> {
    let server = Server::http(addr).map_err(|e| anyhow!("binding {addr}: {e}"))?;
    info!(%addr, "serving report view");
    eprintln!("  Report view at http://{addr}/");

    for request in server.incoming_requests() {
        handle(request, runtime, pipeline);
    }
    Ok(())
}

fn handle<S: ProposalSource>(request: Request, runtime: &Runtime, pipeline: &Pipeline<S>) {
    let matched = route(request.method(), request.url());
    debug!(method = %request.method(), url = %request.url(), route = ?matched, "request");

    let response = match matched {
        Route::Page => page_response(runtime.block_on(pipeline.build(TRACKED_SEEDS))),
        Route::Csv => csv_response(runtime.block_on(pipeline.build(TRACKED_SEEDS))),
        Route::NotFound => with_header(
            Response::from_string("not found").with_status_code(404),
            "Content-Type",
            "text/plain; charset=utf-8",
        ),
    };
    if let Err(e) = request.respond(response) {
        warn!(error = %e, "failed to send response");
    }
}

fn with_header(response: Body, name: &str, value: &str) -> Body {
    match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

fn build_failed(err: &ReportError) -> Body {
    error!(error = %err, "report build failed");
    with_header(
        Response::from_string(format!("report build failed: {err}")).with_status_code(500),
        "Content-Type",
        "text/plain; charset=utf-8",
    )
}

fn page_response(report: Result<Report, ReportError>) -> Body {
    match report {
        Ok(report) => with_header(
            Response::from_string(render_page(&report)),
            "Content-Type",
            "text/html; charset=utf-8",
        ),
        Err(e) => build_failed(&e),
    }
}

fn csv_response(report: Result<Report, ReportError>) -> Body {
    let bytes = match report.and_then(|r| to_csv(&r)) {
        Ok(bytes) => bytes,
        Err(e) => return build_failed(&e),
    };
    let disposition = format!("attachment; filename=\"{CSV_FILE_NAME}\"");
    let response = with_header(
        Response::from_data(bytes),
        "Content-Type",
        "text/csv; charset=utf-8",
    );
    with_header(response, "Content-Disposition", &disposition)
}

/// Render the full HTML page for a report.
fn render_page(report: &Report) -> String {
    let mut html = String::with_capacity(64 * 1024);
    html.push_str("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">");
    html.push_str(&format!("<title>{PAGE_TITLE}</title><style>{STYLE}</style></head><body>\n"));
    html.push_str(&format!("<div class=\"banner\">{}</div>\n", escape_html(BANNER)));
    html.push_str(&format!("<h1>{}</h1>\n", escape_html(HEADING)));

    if report.is_empty() {
        html.push_str(&format!("<p>{}</p>\n", escape_html(EMPTY_NOTICE)));
    } else {
        html.push_str(&render_table(report));
    }

    html.push_str(&format!(
        "<p><a href=\"/{CSV_FILE_NAME}\" download>Download CSV</a></p>\n</body></html>\n"
    ));
    html
}

fn render_table(report: &Report) -> String {
    let batch = report.batch();
    let schema = batch.schema();
    let mut html = String::from("<div class=\"scroll\"><table>\n<thead><tr>");
    for field in schema.fields() {
        html.push_str(&format!("<th>{}</th>", escape_html(field.name())));
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    let options = FormatOptions::default().with_timestamp_format(Some("%Y-%m-%d %H:%M:%S"));
    let formatters: Vec<Option<ArrayFormatter>> = batch
        .columns()
        .iter()
        .map(|col| ArrayFormatter::try_new(col.as_ref(), &options).ok())
        .collect();

    for row in 0..batch.num_rows() {
        html.push_str("<tr>");
        for fmt in &formatters {
            let cell = fmt
                .as_ref()
                .map(|f| f.value(row).to_string())
                .unwrap_or_default();
            html.push_str(&format!("<td>{}</td>", escape_html(&cell)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody></table></div>\n");
    html
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
