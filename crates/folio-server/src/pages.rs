//! Minimal HTML shells for the admin area.
//!
//! The pages only bootstrap a little script against `/api`; every decision
//! about who may see them is made by [`crate::gate`].

use axum::response::Html;

const HEAD: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>folio admin</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 56rem; margin: 2rem auto; padding: 0 1rem; }
  nav a { margin-right: 1rem; }
  li { margin: .25rem 0; }
  .error { color: #b00020; }
</style>
</head>
<body>
"#;

const NAV: &str = r#"<nav>
  <a href="/admin">Dashboard</a>
  <a href="/admin/projects">Projects</a>
  <a href="/admin/contacts">Messages</a>
  <a href="/admin/about">About</a>
  <button id="logout">Log out</button>
</nav>
<script>
document.getElementById('logout').onclick = async () => {
  await fetch('/api/auth/logout', { method: 'POST' });
  location.href = '/admin/login';
};
</script>
"#;

const FOOT: &str = "</body>\n</html>\n";

fn shell(nav: bool, body: &str) -> Html<String> {
  let nav = if nav { NAV } else { "" };
  Html(format!("{HEAD}{nav}{body}{FOOT}"))
}

pub async fn login() -> Html<String> {
  shell(
    false,
    r#"<h1>Sign in</h1>
<form id="login">
  <p><label>Name <input name="name" autocomplete="username" required></label></p>
  <p><label>Password <input name="password" type="password" autocomplete="current-password" required></label></p>
  <p><button type="submit">Sign in</button></p>
  <p class="error" id="error"></p>
</form>
<script>
document.getElementById('login').onsubmit = async (e) => {
  e.preventDefault();
  const form = new FormData(e.target);
  const resp = await fetch('/api/auth/login', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ name: form.get('name'), password: form.get('password') }),
  });
  if (resp.ok) {
    location.href = '/admin';
  } else {
    const body = await resp.json().catch(() => ({}));
    document.getElementById('error').textContent = body.error || 'Login failed';
  }
};
</script>
"#,
  )
}

pub async fn dashboard() -> Html<String> {
  shell(
    true,
    r#"<h1>Dashboard</h1>
<p id="who"></p>
<script>
fetch('/api/auth/me').then(r => r.json()).then(u => {
  if (u.name) document.getElementById('who').textContent = 'Signed in as ' + u.name;
});
</script>
"#,
  )
}

pub async fn projects() -> Html<String> {
  shell(
    true,
    r#"<h1>Projects</h1>
<ol id="items"></ol>
<script>
let items = [];
async function load() {
  items = await (await fetch('/api/projects')).json();
  const list = document.getElementById('items');
  list.innerHTML = '';
  items.forEach((p, i) => {
    const li = document.createElement('li');
    li.textContent = p.title + ' ';
    for (const [label, step] of [['up', -1], ['down', 1]]) {
      const b = document.createElement('button');
      b.textContent = label;
      b.onclick = () => move(i, step);
      li.appendChild(b);
    }
    list.appendChild(li);
  });
}
async function move(i, step) {
  const j = i + step;
  if (j < 0 || j >= items.length) return;
  [items[i], items[j]] = [items[j], items[i]];
  await fetch('/api/projects/reorder', {
    method: 'PUT',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ itemIds: items.map(p => p.id) }),
  });
  await load();
}
load();
</script>
"#,
  )
}

pub async fn contacts() -> Html<String> {
  shell(
    true,
    r#"<h1>Messages</h1>
<ul id="messages"></ul>
<script>
fetch('/api/contacts').then(r => r.json()).then(messages => {
  const list = document.getElementById('messages');
  for (const m of messages) {
    const li = document.createElement('li');
    li.textContent = (m.read ? '' : '[new] ') + m.name + ' <' + m.email + '>: ' + m.message;
    list.appendChild(li);
  }
});
</script>
"#,
  )
}

pub async fn about() -> Html<String> {
  shell(
    true,
    r#"<h1>About</h1>
<pre id="profile"></pre>
<script>
fetch('/api/about').then(r => r.json()).then(p => {
  document.getElementById('profile').textContent = JSON.stringify(p, null, 2);
});
</script>
"#,
  )
}
