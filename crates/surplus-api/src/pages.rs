use axum::{
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;

use surplus_types::models::Session;

use crate::error::AppError;
use crate::filter::Filter;
use crate::render::{self, escape};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    #[serde(default)]
    pub filter: Option<String>,
}

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let session = state.blocking(|s| Ok(s.sessions.current()?)).await?;
    let body = r#"<section class="hero">
<h1>Surplus Food Connect</h1>
<p>Restaurants, grocers and caterers post surplus food. Shelters and neighbours request it before it goes to waste.</p>
<p><a class="btn" href="/donor.html">Donate Food</a> <a class="btn" href="/receiver.html">Find Food</a></p>
</section>
<section class="contact">
<h2>Contact Us</h2>
<form id="contactForm">
<label>Name <input name="name"></label>
<label>Email <input name="email" type="email"></label>
<label>Phone <input name="phone" type="tel"></label>
<label>Message <textarea name="message"></textarea></label>
<button class="btn" type="submit">Send Message</button>
</form>
</section>"#;
    Ok(Html(layout("Home", session.as_ref(), body)))
}

pub async fn login_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let session = state.blocking(|s| Ok(s.sessions.current()?)).await?;
    let body = format!(
        r##"<section class="auth">
<h2>Login</h2>
<form id="loginForm" method="post" action="/auth/login" data-credentials>
{fields}
<button class="btn" type="submit">Login</button>
</form>
<p>No account? <a href="#" id="registerLink">Register</a></p>
</section>
<div class="modal" id="registerModal" style="display: none">
<div class="modal-content">
<h3>Register</h3>
<form id="registerForm" method="post" action="/auth/register" data-credentials>
{fields}
<button class="btn" type="submit">Register</button>
<button class="btn" type="button" id="cancelRegister">Cancel</button>
</form>
</div>
</div>"##,
        fields = credential_fields(),
    );
    Ok(Html(layout("Login", session.as_ref(), &body)))
}

fn credential_fields() -> &'static str {
    r#"<label>Username <input name="username"></label>
<label>Password <input name="password" type="password"></label>
<label>I am a <select name="userType"><option value="">Select...</option><option value="donor">Donor</option><option value="receiver">Receiver</option></select></label>"#
}

pub async fn donor_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let (session, listings) = state
        .blocking(|s| Ok((s.sessions.current()?, s.listings.list()?)))
        .await?;
    let posted = render::donor_view(&listings, session.as_ref()).to_html();

    let body = format!(
        r#"<section class="donor">
<h2>Post Surplus Food</h2>
<form id="foodDonationForm">
<label>Food Name <input name="foodName"></label>
<label>Quantity <input name="quantity" type="number" min="1"></label>
<label>Unit <select name="quantityUnit"><option>servings</option><option>pieces</option><option>kg</option><option>liters</option><option>boxes</option></select></label>
<label>Pickup Location <input name="location"></label>
<label>Pickup By <input name="expiryTime" type="datetime-local"></label>
<label>Food Type <select name="foodType"><option>Cooked Meal</option><option>Fresh Produce</option><option>Packaged Food</option><option>Bakery</option><option>Other</option></select></label>
<label>Additional Info <textarea name="additionalInfo"></textarea></label>
<button class="btn" type="submit">Post Food</button>
</form>
<h2>Your Posted Items</h2>
<div class="posted-items" data-dashboard="donor">{posted}</div>
</section>
<div class="modal" id="successModal" style="display: none">
<div class="modal-content"><p>Food posted successfully!</p><button class="btn" id="closeModal">Close</button></div>
</div>"#
    );
    Ok(Html(layout("Donate", session.as_ref(), &body)))
}

pub async fn receiver_page(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Html<String>, AppError> {
    let (session, listings) = state
        .blocking(|s| Ok((s.sessions.current()?, s.listings.list()?)))
        .await?;

    let filter = query
        .filter
        .as_deref()
        .map(Filter::from_token)
        .unwrap_or_default();
    let mut dashboard = render::receiver_view(&listings);
    let toast = filter.apply(&mut dashboard.cards);

    let buttons: String = Filter::ALL
        .iter()
        .map(|f| {
            let active = if *f == filter { " active" } else { "" };
            format!(
                r#"<a class="filter-btn{}" data-filter="{}" href="?filter={}">{}</a>"#,
                active,
                f.token(),
                f.token(),
                f.label()
            )
        })
        .collect();

    let toast_attr = toast
        .map(|t| format!(r#" data-toast="{}""#, escape(t)))
        .unwrap_or_default();

    let body = format!(
        r#"<section class="receiver">
<h2>Available Food</h2>
<div class="filters">{buttons}</div>
<div class="food-listings" data-dashboard="receiver" data-filter="{filter}"{toast_attr}>{cards}</div>
</section>
<div class="modal" id="requestModal" style="display: none">
<div class="modal-content"><p id="modalFoodName"></p><p>The donor will contact you to coordinate pickup.</p><button class="btn" id="closeRequestModal">Close</button></div>
</div>"#,
        filter = filter.token(),
        cards = dashboard.to_html(),
    );
    Ok(Html(layout("Find Food", session.as_ref(), &body)))
}

fn layout(title: &str, session: Option<&Session>, body: &str) -> String {
    let account = match session {
        Some(s) => format!(
            r#"<li><form method="post" action="/auth/logout"><button class="link" id="logoutBtn" type="submit"><i class="fas fa-sign-out-alt"></i> Logout ({})</button></form></li>"#,
            escape(&s.username)
        ),
        None => r#"<li><a href="/login.html">Login</a></li>"#.to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} | Surplus Food Connect</title>
</head>
<body>
<header><nav><ul class="nav-links">
<li><a href="/index.html">Home</a></li>
<li><a href="/donor.html">Donate</a></li>
<li><a href="/receiver.html">Find Food</a></li>
{account}
</ul></nav></header>
<main>
{body}
</main>
<script>{PAGE_SCRIPT}</script>
</body>
</html>"#,
        title = escape(title),
    )
}

/// Client glue: form submission, request buttons, modals, toasts and the
/// live sync socket. All state lives on the server.
const PAGE_SCRIPT: &str = r#"
(function () {
  const tab = crypto.randomUUID();
  const headers = { 'Content-Type': 'application/json', 'X-Tab-Id': tab };
  const $ = (id) => document.getElementById(id);

  function toast(message, ms) {
    const n = document.createElement('div');
    n.className = 'notification';
    n.textContent = message;
    document.body.appendChild(n);
    setTimeout(() => n.remove(), ms || 3000);
  }

  function dialog(d, modal, textEl) {
    if (d.kind === 'modal' && modal) {
      if (textEl) textEl.textContent = d.text;
      modal.style.display = 'flex';
    } else {
      alert(d.text);
    }
  }

  async function send(url, body) {
    const res = await fetch(url, { method: 'POST', headers, body: JSON.stringify(body) });
    const data = await res.json();
    if (!res.ok) { alert(data.alert); return null; }
    return data;
  }

  const donorForm = $('foodDonationForm');
  if (donorForm) {
    donorForm.addEventListener('submit', async (e) => {
      e.preventDefault();
      const body = Object.fromEntries(new FormData(donorForm));
      body.modal = !!$('successModal');
      const data = await send('/listings', body);
      if (!data) return;
      dialog(data.dialog, $('successModal'));
      donorForm.reset();
      document.querySelector('.posted-items').innerHTML = data.posted_items_html;
    });
  }

  for (const form of document.querySelectorAll('form[data-credentials]')) {
    form.addEventListener('submit', async (e) => {
      e.preventDefault();
      const res = await fetch(form.action, { method: 'POST', body: new URLSearchParams(new FormData(form)) });
      if (!res.ok) { alert((await res.json()).alert); return; }
      location.href = res.url;
    });
  }

  const contactForm = $('contactForm');
  if (contactForm) {
    contactForm.addEventListener('submit', async (e) => {
      e.preventDefault();
      const data = await send('/contact', Object.fromEntries(new FormData(contactForm)));
      if (!data) return;
      toast(data.toast, 5000);
      contactForm.reset();
    });
  }

  document.addEventListener('click', async (e) => {
    const button = e.target.closest('button[data-food-id]');
    if (!button || button.disabled) return;
    button.disabled = true;
    const data = await send('/listings/' + button.dataset.foodId + '/request', { modal: !!$('requestModal') });
    if (!data) return;
    button.closest('.food-card').outerHTML = data.card_html;
    dialog(data.dialog, $('requestModal'), $('modalFoodName'));
    toast(data.toast);
  });

  for (const [modalId, closeId] of [['successModal', 'closeModal'], ['requestModal', 'closeRequestModal'], ['registerModal', 'cancelRegister']]) {
    const modal = $(modalId), close = $(closeId);
    if (modal && close) close.addEventListener('click', () => { modal.style.display = 'none'; });
  }
  const registerLink = $('registerLink');
  if (registerLink) registerLink.addEventListener('click', (e) => { e.preventDefault(); $('registerModal').style.display = 'flex'; });

  const board = document.querySelector('[data-dashboard]');
  if (board) {
    if (board.dataset.toast) toast(board.dataset.toast);
    const proto = location.protocol === 'https:' ? 'wss://' : 'ws://';
    let url = proto + location.host + '/sync?page=' + board.dataset.dashboard + '&tab=' + tab;
    if (board.dataset.filter) url += '&filter=' + encodeURIComponent(board.dataset.filter);
    const ws = new WebSocket(url);
    ws.onmessage = (msg) => {
      const frame = JSON.parse(msg.data);
      if (frame.type !== 'Render') return;
      board.innerHTML = frame.data.html;
      if (frame.data.toast) toast(frame.data.toast);
    };
  }
})();
"#;
