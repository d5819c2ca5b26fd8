//! The static question form.

/// Index page served at `/`.
pub const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Research Assistant</title>
<style>
  body { font-family: sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }
  textarea { width: 100%; min-height: 4rem; }
  #answer { white-space: pre-wrap; border-left: 3px solid #888; padding-left: 1rem; }
  .error { color: #b00; }
  .turn { margin-bottom: 1rem; }
  .ts { color: #666; font-size: 0.85em; }
</style>
</head>
<body>
<h1>Research Assistant</h1>
<form id="ask">
  <textarea name="question" placeholder="Ask a question"></textarea>
  <button type="submit">Ask</button>
</form>
<div id="answer"></div>
<h2>History</h2>
<div id="history"></div>
<script>
let sessionId = sessionStorage.getItem("ra-session");

function text(tag, value, cls) {
  const el = document.createElement(tag);
  el.textContent = value;
  if (cls) el.className = cls;
  return el;
}

async function loadHistory() {
  const res = await fetch("/api/history?limit=20");
  const box = document.getElementById("history");
  box.replaceChildren();
  if (!res.ok) return;
  for (const turn of await res.json()) {
    const div = document.createElement("div");
    div.className = "turn";
    div.append(text("div", "Q: " + turn.question));
    div.append(text("div", "A: " + (turn.answer || "(no answer)")));
    div.append(text("div", turn.timestamp, "ts"));
    box.append(div);
  }
}

document.getElementById("ask").addEventListener("submit", async (ev) => {
  ev.preventDefault();
  const question = ev.target.question.value;
  const out = document.getElementById("answer");
  out.replaceChildren(text("em", "Thinking..."));
  const res = await fetch("/api/ask", {
    method: "POST",
    headers: { "content-type": "application/json" },
    body: JSON.stringify({ question, session_id: sessionId }),
  });
  const body = await res.json();
  if (body.session_id) {
    sessionId = body.session_id;
    sessionStorage.setItem("ra-session", sessionId);
  }
  out.replaceChildren();
  if (body.answer) out.append(text("div", body.answer));
  if (body.error) out.append(text("div", body.error, "error"));
  if (res.ok) ev.target.question.value = "";
  loadHistory();
});

loadHistory();
</script>
</body>
</html>
"#;
