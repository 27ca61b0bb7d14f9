//! HTML shell served at `/preview/:id`.
//!
//! The page shows the raw draft body and opens the live socket. On `reload`
//! it refetches itself; on `expired` it shows a banner and stops pinging.

use crate::domain::preview::PreviewSession;
use crate::ports::Draft;

/// Client heartbeat period in milliseconds.
const PING_INTERVAL_MS: u64 = 30_000;

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

pub fn render_preview_page(session: &PreviewSession, draft: &Draft) -> String {
    let title = escape_html(&draft.title);
    let body = escape_html(&draft.body);
    let session_id = escape_html(session.id().as_str());

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="robots" content="noindex">
<title>Preview: {title}</title>
<style>
body {{ font-family: system-ui, sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }}
.preview-banner {{ background: #fff4ce; border: 1px solid #e0c36c; padding: .5rem 1rem; }}
.preview-banner.expired {{ background: #fde2e1; border-color: #d9827d; }}
.draft-body {{ white-space: pre-wrap; font-family: inherit; }}
</style>
</head>
<body data-session-id="{session_id}">
<div class="preview-banner" id="preview-status">Draft preview: live</div>
<h1>{title}</h1>
<article><pre class="draft-body">{body}</pre></article>
<script>
(function () {{
  var sessionId = document.body.dataset.sessionId;
  var status = document.getElementById("preview-status");
  var scheme = location.protocol === "https:" ? "wss://" : "ws://";
  var socket = new WebSocket(scheme + location.host + "/api/preview/ws/" + sessionId);
  var heartbeat = null;

  socket.onopen = function () {{
    heartbeat = setInterval(function () {{
      socket.send(JSON.stringify({{ type: "ping" }}));
    }}, {ping_interval});
  }};
  socket.onmessage = function (event) {{
    var message = JSON.parse(event.data);
    if (message.type === "reload") {{
      location.reload();
    }} else if (message.type === "expired") {{
      status.textContent = "Preview session " + message.reason + ". Request a new preview.";
      status.className = "preview-banner expired";
    }}
  }};
  socket.onclose = function (event) {{
    clearInterval(heartbeat);
    if (event.code === 4000) {{
      status.textContent = "Preview opened in another tab.";
    }} else if (status.className.indexOf("expired") === -1) {{
      status.textContent = "Live updates disconnected.";
    }}
  }};
}})();
</script>
</body>
</html>
"#,
        title = title,
        body = body,
        session_id = session_id,
        ping_interval = PING_INTERVAL_MS,
    )
}

/// Page shown when the session or its draft is gone.
pub fn render_unavailable_page(message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="robots" content="noindex">
<title>Preview unavailable</title>
</head>
<body>
<h1>Preview unavailable</h1>
<p>{}</p>
</body>
</html>
"#,
        escape_html(message)
    )
}
