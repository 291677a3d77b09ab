//! Server-rendered admin pages. The manager page is behind the session
//! guard; the login page stays reachable so a session can be established.

use axum::{
    Extension,
    extract::Query,
    response::Html,
};
use serde::Deserialize;

use crate::web::{
    headers::CspNonce,
    templates::{escape_html, render_page},
};

#[derive(Default, Deserialize)]
pub struct LoginQuery {
    pub redirect: Option<String>,
}

/// Only site-internal targets are allowed back out of the login flow, so a
/// crafted link cannot bounce a freshly authenticated admin off-site.
pub fn sanitize_redirect(input: Option<&str>) -> &str {
    match input {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/admin/publications",
    }
}

pub async fn login_page(
    Extension(CspNonce(nonce)): Extension<CspNonce>,
    Query(params): Query<LoginQuery>,
) -> Html<String> {
    let redirect = sanitize_redirect(params.redirect.as_deref());

    let main = format!(
        r#"<section class="panel" style="max-width: 420px; margin: 3rem auto;">
    <h1>Admin Login</h1>
    <p class="muted">Enter the admin password to continue.</p>
    <form id="login-form" data-redirect="{redirect}" autocomplete="off">
        <label for="password">Admin password</label>
        <input id="password" type="password" name="password" required
               style="width: 100%; padding: 0.75rem; margin: 0.5rem 0 1rem; border-radius: 8px; border: 1px solid #cbd5f5; box-sizing: border-box;">
        <p id="login-error" class="muted" style="color: #b91c1c; display: none;"></p>
        <button type="submit"
                style="width: 100%; padding: 0.85rem; border: none; border-radius: 8px; background: #2563eb; color: #ffffff; font-weight: 600; cursor: pointer;">Login</button>
    </form>
</section>
<script nonce="{nonce}">
(function () {{
    const form = document.getElementById('login-form');
    const errorBox = document.getElementById('login-error');
    form.addEventListener('submit', async (event) => {{
        event.preventDefault();
        errorBox.style.display = 'none';
        const password = document.getElementById('password').value;
        try {{
            const res = await fetch('/api/admin/auth', {{
                method: 'POST',
                headers: {{ 'Content-Type': 'application/json' }},
                credentials: 'include',
                body: JSON.stringify({{ password }})
            }});
            if (!res.ok) {{
                const data = await res.json().catch(() => ({{}}));
                throw new Error(data.error || 'Login failed');
            }}
            window.location.href = form.dataset.redirect;
        }} catch (err) {{
            errorBox.textContent = err.message || 'Login failed';
            errorBox.style.display = 'block';
        }}
    }});
}})();
</script>"#,
        redirect = escape_html(redirect),
        nonce = nonce,
    );

    Html(render_page("Admin Login", &nonce, &main))
}

pub async fn publications_admin_page(
    Extension(CspNonce(nonce)): Extension<CspNonce>,
) -> Html<String> {
    let main = format!(
        r#"<h1>Manage publications</h1>
<section class="panel">
    <form id="pub-form" autocomplete="off">
        <input type="hidden" id="pub-id">
        <label for="pub-title">Title</label>
        <input id="pub-title" required>
        <label for="pub-authors">Authors (one per line)</label>
        <textarea id="pub-authors" rows="3" required></textarea>
        <label for="pub-venue">Venue</label>
        <input id="pub-venue">
        <label for="pub-year">Year</label>
        <input id="pub-year">
        <label for="pub-type">Type</label>
        <input id="pub-type" placeholder="Journal or Conference">
        <label for="pub-doi">DOI</label>
        <input id="pub-doi">
        <label for="pub-link">Link</label>
        <input id="pub-link">
        <label for="pub-volume">Volume</label>
        <input id="pub-volume">
        <label for="pub-issue">Issue</label>
        <input id="pub-issue">
        <label for="pub-pages">Pages</label>
        <input id="pub-pages">
        <label for="pub-summary">Summary</label>
        <textarea id="pub-summary" rows="2"></textarea>
        <p id="pub-error" class="muted" style="color: #b91c1c; display: none;"></p>
        <button type="submit">Save</button>
        <button type="button" id="pub-reset">Clear</button>
        <button type="button" id="logout">Log out</button>
    </form>
</section>
<section class="panel">
    <table style="width: 100%; border-collapse: collapse;">
        <thead>
            <tr><th>Id</th><th>Title</th><th>Authors</th><th>Year</th><th></th></tr>
        </thead>
        <tbody id="pub-rows"></tbody>
    </table>
</section>
<script nonce="{nonce}">
(function () {{
    const api = '/api/admin/publications';
    const form = document.getElementById('pub-form');
    const errorBox = document.getElementById('pub-error');
    const rows = document.getElementById('pub-rows');

    const field = (id) => document.getElementById(id);
    const fields = ['title', 'authors', 'venue', 'year', 'type', 'doi', 'link', 'volume', 'issue', 'pages', 'summary'];

    function showError(message) {{
        errorBox.textContent = message;
        errorBox.style.display = 'block';
    }}

    async function ensureSession() {{
        const res = await fetch('/api/admin/auth/check', {{ credentials: 'include' }});
        if (!res.ok) {{
            window.location.href = '/admin/login?redirect=/admin/publications';
            return false;
        }}
        return true;
    }}

    function payload() {{
        const body = {{}};
        for (const name of fields) {{
            const value = field('pub-' + name).value.trim();
            if (name === 'authors') {{
                body.authors = value.split('\n').map((v) => v.trim()).filter(Boolean);
            }} else if (value !== '') {{
                body[name] = value;
            }}
        }}
        return body;
    }}

    function fillForm(pub) {{
        field('pub-id').value = pub.id;
        for (const name of fields) {{
            const value = name === 'authors' ? (pub.authors || []).join('\n') : pub[name];
            field('pub-' + name).value = value == null ? '' : value;
        }}
    }}

    function row(pub) {{
        const tr = document.createElement('tr');
        for (const text of [pub.id, pub.title, (pub.authors || []).join(', '), pub.year == null ? '' : pub.year]) {{
            const td = document.createElement('td');
            td.textContent = text;
            tr.appendChild(td);
        }}
        const actions = document.createElement('td');
        const edit = document.createElement('button');
        edit.type = 'button';
        edit.textContent = 'Edit';
        edit.addEventListener('click', () => fillForm(pub));
        const del = document.createElement('button');
        del.type = 'button';
        del.textContent = 'Delete';
        del.addEventListener('click', async () => {{
            if (!window.confirm('Delete "' + pub.title + '"?')) return;
            const res = await fetch(api + '/' + pub.id, {{ method: 'DELETE', credentials: 'include' }});
            if (!res.ok) {{
                const data = await res.json().catch(() => ({{}}));
                showError(data.error || 'Delete failed');
                return;
            }}
            refresh();
        }});
        actions.appendChild(edit);
        actions.appendChild(del);
        tr.appendChild(actions);
        return tr;
    }}

    async function refresh() {{
        errorBox.style.display = 'none';
        const res = await fetch(api, {{ credentials: 'include' }});
        if (!res.ok) {{
            const data = await res.json().catch(() => ({{}}));
            showError(data.error || 'Failed to load publications');
            return;
        }}
        const data = await res.json();
        rows.replaceChildren(...(data.publications || []).map(row));
    }}

    form.addEventListener('submit', async (event) => {{
        event.preventDefault();
        errorBox.style.display = 'none';
        const id = field('pub-id').value;
        const res = await fetch(id ? api + '/' + id : api, {{
            method: id ? 'PUT' : 'POST',
            headers: {{ 'Content-Type': 'application/json' }},
            credentials: 'include',
            body: JSON.stringify(payload())
        }});
        if (!res.ok) {{
            const data = await res.json().catch(() => ({{}}));
            showError(data.error || 'Save failed');
            return;
        }}
        form.reset();
        field('pub-id').value = '';
        refresh();
    }});

    document.getElementById('pub-reset').addEventListener('click', () => {{
        form.reset();
        field('pub-id').value = '';
    }});

    document.getElementById('logout').addEventListener('click', async () => {{
        await fetch('/api/admin/logout', {{ method: 'POST', credentials: 'include' }});
        window.location.href = '/';
    }});

    ensureSession().then((ok) => {{
        if (ok) refresh();
    }});
}})();
</script>"#,
        nonce = nonce,
    );

    Html(render_page("Manage publications", &nonce, &main))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_targets_are_restricted_to_internal_paths() {
        assert_eq!(sanitize_redirect(Some("/admin/publications")), "/admin/publications");
        assert_eq!(sanitize_redirect(Some("/news")), "/news");
        assert_eq!(sanitize_redirect(Some("https://evil.example")), "/admin/publications");
        assert_eq!(sanitize_redirect(Some("//evil.example")), "/admin/publications");
        assert_eq!(sanitize_redirect(None), "/admin/publications");
    }
}
