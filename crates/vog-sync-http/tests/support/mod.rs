#![allow(dead_code)]

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SEP_2001: &str = "Sun, 09 Sep 2001 01:46:40 GMT";
pub const SEP_2001_SECS: u64 = 1_000_000_000;
pub const JUL_2017: &str = "Fri, 14 Jul 2017 02:40:00 GMT";
pub const JUL_2017_SECS: u64 = 1_500_000_000;

/// Serve an Apache-style index page at `dir` (which must end in `/`)
/// linking to `entries`, plus the usual sort and parent links.
pub async fn mount_listing(server: &MockServer, dir: &str, entries: &[&str]) {
    let mut html = String::from(
        "<html><body><h1>Index</h1><table>\n\
         <tr><th><a href=\"?C=N;O=D\">Name</a></th><th><a href=\"?C=M;O=A\">Last modified</a></th></tr>\n\
         <tr><td><a href=\"../\">Parent Directory</a></td></tr>\n",
    );
    for entry in entries {
        html.push_str(&format!(
            "<tr><td><a href=\"{entry}\">{entry}</a></td></tr>\n"
        ));
    }
    html.push_str("</table></body></html>");

    Mock::given(method("GET"))
        .and(path(dir))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html"))
        .mount(server)
        .await;
}

/// Serve a file for both `HEAD` and `GET` with the given `Last-Modified`.
pub async fn mount_file(server: &MockServer, file_path: &str, content: &[u8], last_modified: &str) {
    for verb in ["HEAD", "GET"] {
        Mock::given(method(verb))
            .and(path(file_path))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Last-Modified", last_modified)
                    .set_body_bytes(content.to_vec()),
            )
            .mount(server)
            .await;
    }
}

/// Number of `GET` requests the server has seen for `file_path`.
pub async fn downloads_of(server: &MockServer, file_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == "GET" && r.url.path() == file_path)
        .count()
}

pub fn file_names(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}
