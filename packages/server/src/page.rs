//! Server-rendered landing page.
//!
//! The page works without JavaScript for downloads; the inline script adds
//! uploads with progress, deletes and list refresh through the JSON API.

use std::fmt::Write;

use common::{DiskUsage, StoredFile};

pub struct HomePage<'a> {
    pub share_url: &'a str,
    pub qr_src: String,
    pub disk: Option<DiskUsage>,
    pub max_upload_size: String,
    pub allowed_extensions: &'a [String],
    pub files: &'a [StoredFile],
}

impl HomePage<'_> {
    pub fn render(&self) -> String {
        let share_url = escape_html(self.share_url);
        let qr_src = escape_html(&self.qr_src);
        let max_upload = escape_html(&self.max_upload_size);

        let accept = self
            .allowed_extensions
            .iter()
            .map(|ext| format!(".{}", escape_html(ext)))
            .collect::<Vec<_>>()
            .join(",");
        let allowed_note = if self.allowed_extensions.is_empty() {
            "any type".to_string()
        } else {
            escape_html(&self.allowed_extensions.join(", "))
        };

        let disk = match &self.disk {
            Some(usage) => format!(
                "<p class=\"disk\">Disk: {} used of {}, {} free</p>",
                usage.used_human(),
                usage.total_human(),
                usage.free_human()
            ),
            None => String::new(),
        };

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>LAN File Share</title>
<style>{STYLE}</style>
</head>
<body>
<header>
  <h1>LAN File Share</h1>
  <p>Open <a href="{share_url}">{share_url}</a> on any device in this network.</p>
  <img class="qr" src="{qr_src}" alt="QR code for {share_url}">
  {disk}
</header>
<section>
  <h2>Upload</h2>
  <form id="upload-form" action="/upload" method="post" enctype="multipart/form-data">
    <input type="file" name="file" id="file-input" accept="{accept}" multiple>
    <button type="submit">Upload</button>
  </form>
  <p class="hint">Max {max_upload} per file. Allowed: {allowed_note}.</p>
  <progress id="progress" max="100" value="0" hidden></progress>
  <p id="status"></p>
</section>
<section>
  <h2>Files</h2>
  <table>
    <thead><tr><th>Name</th><th>Size</th><th>Modified</th><th></th></tr></thead>
    <tbody id="file-rows">
{rows}    </tbody>
  </table>
</section>
<script>{SCRIPT}</script>
</body>
</html>
"#,
            rows = self.render_rows(),
        )
    }

    fn render_rows(&self) -> String {
        if self.files.is_empty() {
            return "      <tr><td colspan=\"4\">No files yet</td></tr>\n".to_string();
        }

        let mut rows = String::new();
        for file in self.files {
            let name = escape_html(&file.name);
            let href = percent_encode_segment(&file.name);
            let _ = writeln!(
                rows,
                "      <tr><td><a href=\"/download/{href}\">{name}</a></td><td>{}</td><td>{}</td>\
                 <td><button data-name=\"{name}\" class=\"delete\">Delete</button></td></tr>",
                escape_html(&file.size_human),
                file.modified_at.format("%Y-%m-%d %H:%M:%S"),
            );
        }
        rows
    }
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encode a single URL path segment.
fn percent_encode_segment(input: &str) -> String {
    input
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                String::from(b as char)
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:860px;margin:0 auto;padding:1rem;color:#1a237e}\
header{text-align:center}.qr{width:200px;height:200px;image-rendering:pixelated}\
table{width:100%;border-collapse:collapse}td,th{padding:.4rem;border-bottom:1px solid #ddd;text-align:left}\
.hint,.disk{color:#555;font-size:.9rem}button.delete{color:#b71c1c}";

const SCRIPT: &str = r#"
const rows = document.getElementById('file-rows');
const statusLine = document.getElementById('status');
const progress = document.getElementById('progress');

function escapeHtml(s) {
  return s.replace(/[&<>"']/g, c => ({'&':'&amp;','<':'&lt;','>':'&gt;','"':'&quot;',"'":'&#39;'}[c]));
}

async function refresh() {
  const res = await fetch('/files');
  if (!res.ok) return;
  const files = await res.json();
  rows.innerHTML = files.length === 0
    ? '<tr><td colspan="4">No files yet</td></tr>'
    : files.map(f => `<tr><td><a href="/download/${encodeURIComponent(f.name)}">${escapeHtml(f.name)}</a></td>` +
        `<td>${escapeHtml(f.size)}</td><td>${escapeHtml(f.modified)}</td>` +
        `<td><button data-name="${escapeHtml(f.name)}" class="delete">Delete</button></td></tr>`).join('');
}

function upload(file) {
  return new Promise(resolve => {
    const form = new FormData();
    form.append('file', file);
    const xhr = new XMLHttpRequest();
    xhr.open('POST', '/upload');
    xhr.upload.onprogress = e => {
      if (e.lengthComputable) progress.value = (e.loaded / e.total) * 100;
    };
    xhr.onload = () => {
      let body = {};
      try { body = JSON.parse(xhr.responseText); } catch (_) {}
      statusLine.textContent = xhr.status === 200
        ? `Uploaded ${body.file.name}`
        : `${file.name}: ${body.message || xhr.statusText}`;
      resolve();
    };
    xhr.onerror = () => { statusLine.textContent = `${file.name}: upload failed`; resolve(); };
    xhr.send(form);
  });
}

document.getElementById('upload-form').addEventListener('submit', async e => {
  e.preventDefault();
  const input = document.getElementById('file-input');
  progress.hidden = false;
  for (const file of input.files) {
    progress.value = 0;
    await upload(file);
  }
  progress.hidden = true;
  input.value = '';
  refresh();
});

rows.addEventListener('click', async e => {
  const name = e.target.dataset && e.target.dataset.name;
  if (!name || !confirm(`Delete ${name}?`)) return;
  const res = await fetch(`/delete/${encodeURIComponent(name)}`, { method: 'DELETE' });
  const body = await res.json().catch(() => ({}));
  statusLine.textContent = body.message || res.statusText;
  refresh();
});
"#;
