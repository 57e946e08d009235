//! Browser dashboard served on `GET /`.
//!
//! A static page whose script polls the feed endpoint on a timer while the
//! user has pressed Start, appending every non-empty response to a text
//! area. Everything the page needs from the server is passed through
//! `data-*` attributes on `<body>`, so the script itself never changes.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::Html;

use crate::config::RelayConfig;
use crate::mode::{FeedAddress, TenancyMode};
use crate::server::AppState;

const PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Oasis dashboard</title>
<style>
  #oasis_output { resize: none; }
  .oasis-button {
    background-color: #e1ecf4;
    border: 1px solid #7aa7c7;
    border-radius: 3px;
    color: #39739d;
    cursor: pointer;
    font-size: 13px;
    padding: 8px .8em;
  }
  .oasis-button:hover { background-color: #b3d3ea; color: #2c5777; }
  .oasis-button:disabled { border-color: #999999; background-color: #cccccc; color: #666666; }
</style>
<script>
window.addEventListener("load", () => {
  const body = document.body;
  const feedUrl = body.dataset.feedUrl;
  const pollMs = Number(body.dataset.pollIntervalMs);
  const maxLines = Number(body.dataset.maxLines);
  const output = document.getElementById("oasis_output");
  const idInput = document.getElementById("oasis_id");
  const start = document.getElementById("start_oasis");
  const stop = document.getElementById("stop_oasis");
  let timer = null;
  let generation = 0;

  function append(text) {
    const lines = output.value === "" ? 0 : output.value.split("\n").length - 1;
    if (lines >= maxLines) {
      output.value = "clearing\n";
    }
    output.value += text + "\n";
  }

  function url() {
    if (idInput === null) {
      return feedUrl;
    }
    return feedUrl + "?identifier=" + encodeURIComponent(idInput.value);
  }

  async function poll(gen) {
    if (gen !== generation) {
      return;
    }
    try {
      const resp = await fetch(url());
      if (resp.ok) {
        const text = await resp.text();
        if (text !== "") {
          append(text);
        }
      }
    } catch (err) {
      console.warn("feed poll failed", err);
    }
    if (gen === generation && timer !== null) {
      timer = setTimeout(poll, pollMs, gen);
    }
  }

  stop.disabled = true;
  start.onclick = () => {
    generation += 1;
    timer = setTimeout(poll, 0, generation);
    start.disabled = true;
    stop.disabled = false;
  };
  stop.onclick = () => {
    generation += 1;
    clearTimeout(timer);
    timer = null;
    start.disabled = false;
    stop.disabled = true;
  };
});
</script>
</head>
<body data-feed-url="{{feed_url}}" data-poll-interval-ms="{{poll_interval_ms}}" data-max-lines="{{max_lines}}">
  <div>Oasis output</div>
  <textarea id="oasis_output" rows="20" cols="100" readonly></textarea>
  <br /><br />
{{identifier_input}}
  <button id="start_oasis" class="oasis-button">Start</button>
  <button id="stop_oasis" class="oasis-button">Stop</button>
</body>
</html>
"##;

const IDENTIFIER_INPUT: &str = r#"  <div>Oasis id</div>
  <input type="text" id="oasis_id" name="identifier" size="10" />
  <br /><br />"#;

/// Handler for `GET /` — renders the dashboard for the requesting host.
pub async fn home(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok());
    Html(render(&state.config, &state.fixed_authority, host))
}

/// `host:port` a browser can dial for a listener bound to `local`.
///
/// Wildcard binds (`0.0.0.0`, `::`) are not dialable and are replaced by
/// the loopback address of the same family.
#[must_use]
pub fn reachable_authority(local: SocketAddr) -> String {
    let ip = match local.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    SocketAddr::new(ip, local.port()).to_string()
}

/// Absolute feed URL the dashboard script should poll.
///
/// Under [`FeedAddress::PerRequest`] the request's `Host` header is used
/// when present; otherwise `fixed_authority`, the bound listener address.
#[must_use]
pub fn feed_url(config: &RelayConfig, fixed_authority: &str, host: Option<&str>) -> String {
    let authority = match (config.feed_address(), host) {
        (FeedAddress::PerRequest, Some(host)) if !host.is_empty() => host,
        _ => fixed_authority,
    };
    format!("http://{authority}/feed")
}

/// Render the complete dashboard page.
#[must_use]
pub fn render(config: &RelayConfig, fixed_authority: &str, host: Option<&str>) -> String {
    let identifier_input = match config.mode {
        TenancyMode::Single => "",
        TenancyMode::Multi => IDENTIFIER_INPUT,
    };

    let url = feed_url(config, fixed_authority, host);
    PAGE.replace("{{feed_url}}", &escape_html(&url))
        .replace(
            "{{poll_interval_ms}}",
            &config.dashboard.poll_interval_ms.to_string(),
        )
        .replace("{{max_lines}}", &config.dashboard.max_lines.to_string())
        .replace("{{identifier_input}}", identifier_input)
}

/// Escape text for use inside an HTML attribute value.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
