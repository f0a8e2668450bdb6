use crate::session::{SessionRegistry, generate_session_id};
use crate::{
    Category, Contact, Definition, DirectoryLink, Entry, NavigationState, SearchEngine,
    SearchResults, SearchTerms, View, dutch_reading_link, encode_uri_component,
};
use askama::Template;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{COOKIE, SET_COOKIE},
    },
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{debug, info, warn};

type SharedState = Arc<AppState>;

pub const SESSION_COOKIE: &str = "zk_session";
const MAX_SESSION_ID_LEN: usize = 64;

#[derive(Clone)]
pub struct AppState {
    pub engine: &'static SearchEngine<'static>,
    pub sessions: SessionRegistry,
    pub base_url: String,
}

#[derive(Debug, Clone, Copy)]
struct Chrome {
    body_class: &'static str,
    header_class: &'static str,
    main_class: &'static str,
    eyebrow_class: &'static str,
    headline_class: &'static str,
    lede_class: &'static str,
    nav_class: &'static str,
    nav_link_class: &'static str,
    nav_active_class: &'static str,
    input_class: &'static str,
    button_class: &'static str,
    grid_class: &'static str,
    card_class: &'static str,
    link_class: &'static str,
}

impl Default for Chrome {
    fn default() -> Self {
        Self {
            body_class: "bg-stone-50 text-stone-900",
            header_class: "bg-rose-900 text-white",
            main_class: "max-w-5xl mx-auto py-8 px-4 space-y-6",
            eyebrow_class: "uppercase tracking-wide text-sm text-rose-200",
            headline_class: "text-3xl font-extrabold tracking-tight",
            lede_class: "text-lg text-stone-600",
            nav_class: "max-w-5xl mx-auto px-4 pb-3 flex flex-wrap gap-2",
            nav_link_class: "rounded-full px-4 py-1 text-sm bg-rose-800 hover:bg-rose-700",
            nav_active_class: "rounded-full px-4 py-1 text-sm bg-white text-rose-900 font-semibold",
            input_class: "flex-1 rounded-md border border-stone-300 px-3 py-2",
            button_class: "inline-flex items-center rounded-md bg-rose-900 px-4 py-2 text-white font-semibold shadow hover:bg-rose-800",
            grid_class: "grid gap-4 md:grid-cols-2",
            card_class: "block rounded-lg bg-white p-4 shadow-sm border border-stone-200 space-y-1",
            link_class: "text-rose-800 hover:underline",
        }
    }
}

#[derive(Clone)]
pub struct WebConfig {
    pub addr: SocketAddr,
    pub base_url: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            base_url: "http://127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum WebError {
    Io(std::io::Error),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for WebError {}

impl From<std::io::Error> for WebError {
    fn from(value: std::io::Error) -> Self {
        WebError::Io(value)
    }
}

/// Serves the embedded dataset.
pub async fn serve(config: WebConfig) -> Result<(), WebError> {
    serve_engine(SearchEngine::embedded(), config).await
}

pub async fn serve_engine(
    engine: &'static SearchEngine<'static>,
    config: WebConfig,
) -> Result<(), WebError> {
    let state = Arc::new(AppState {
        engine,
        sessions: SessionRegistry::new(),
        base_url: config.base_url.clone(),
    });
    let router = build_router(state);
    info!(
        %config.addr,
        base = %config.base_url,
        categories = engine.store().categories().len(),
        "Binding HTTP listener"
    );
    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server exited");
    Ok(())
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.message });
        (self.status, Json(payload)).into_response()
    }
}

fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(overview))
        .route("/categorie", get(category_detail))
        .route("/begrippen", get(glossary))
        .route("/contacten", get(contacts))
        .route("/annuaires", get(directories))
        .route("/zoeken", get(global_search))
        .route("/api/search", get(api_search))
        .route("/api/expand", get(api_expand))
        .route("/api/state", get(api_state))
        .route("/healthz", get(health))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CompressionLayer::new())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Browser identity carried in the `zk_session` cookie.
struct Visitor {
    id: String,
    fresh: bool,
}

impl Visitor {
    fn from_headers(headers: &HeaderMap) -> Self {
        match session_cookie(headers) {
            Some(id) => Self { id, fresh: false },
            None => Self {
                id: generate_session_id(),
                fresh: true,
            },
        }
    }

    fn respond(self, response: impl IntoResponse) -> Response {
        let mut response = response.into_response();
        if self.fresh {
            let cookie = Cookie::build((SESSION_COOKIE, self.id))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .build();
            match HeaderValue::from_str(&cookie.to_string()) {
                Ok(value) => {
                    response.headers_mut().append(SET_COOKIE, value);
                }
                Err(err) => warn!(%err, "session cookie is not a valid header value"),
            }
        }
        response
    }
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| Cookie::split_parse(raw))
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|id| is_valid_session_id(id))
}

fn is_valid_session_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_SESSION_ID_LEN
        && id.chars().all(|c| c.is_ascii_alphanumeric())
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CategoryParams {
    id: Option<String>,
}

async fn overview(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let visitor = Visitor::from_headers(&headers);
    let (transition, nav) = state
        .sessions
        .with_session(&visitor.id, |nav| (nav.go_home(), nav.clone()));
    let page = render_dashboard(&state, &nav, transition.resets_scroll());
    visitor.respond(Html(page))
}

async fn category_detail(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<CategoryParams>,
) -> Response {
    let visitor = Visitor::from_headers(&headers);
    let id = params.id.unwrap_or_default();
    let store = state.engine.store();
    let (transition, nav) = state.sessions.with_session(&visitor.id, |nav| {
        (nav.select_category(store, id.trim()), nav.clone())
    });
    if transition.to != View::CategoryDetail {
        return visitor.respond(Redirect::to("/"));
    }
    let page = render_dashboard(&state, &nav, transition.resets_scroll());
    visitor.respond(Html(page))
}

async fn glossary(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Response {
    list_view(&state, &headers, View::Glossary, params.q)
}

async fn contacts(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Response {
    list_view(&state, &headers, View::Contacts, params.q)
}

async fn directories(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Response {
    list_view(&state, &headers, View::Directories, params.q)
}

/// Entering a list view is a transition; re-submitting the search box on the
/// view already shown only replaces the typed text.
fn list_view(state: &AppState, headers: &HeaderMap, view: View, query: Option<String>) -> Response {
    let visitor = Visitor::from_headers(headers);
    let (transition, nav) = state.sessions.with_session(&visitor.id, |nav| {
        let transition = if nav.view() == view {
            if let Some(query) = query.as_deref() {
                nav.set_search_text(query);
            }
            None
        } else {
            Some(nav.navigate_to(view, query.as_deref()))
        };
        (transition, nav.clone())
    });
    let scroll_reset = transition.is_some_and(|t| t.resets_scroll());
    visitor.respond(Html(render_dashboard(state, &nav, scroll_reset)))
}

async fn global_search(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let query = params.q.unwrap_or_default();
    let results = state.engine.search(&query);
    let target = results.best_view().unwrap_or(View::Glossary);
    debug!(query = %results.query, hits = results.total(), view = %target, "global search");
    Redirect::to(&list_href(target, results.query.as_str())).into_response()
}

async fn api_search(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResults<'static>> {
    Json(state.engine.search(params.q.as_deref().unwrap_or_default()))
}

#[derive(Debug, Serialize)]
struct ExpandPayload {
    query: String,
    terms: SearchTerms,
}

async fn api_expand(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Json<ExpandPayload> {
    let query = params.q.unwrap_or_default();
    let terms = state.engine.expand(&query);
    Json(ExpandPayload { query, terms })
}

#[derive(Debug, Serialize)]
struct StatePayload {
    created_at: Option<u64>,
    #[serde(flatten)]
    state: NavigationState,
}

async fn api_state(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<StatePayload>, ApiError> {
    let id = session_cookie(&headers)
        .ok_or_else(|| ApiError::not_found(format!("No `{SESSION_COOKIE}` cookie sent")))?;
    let nav = state
        .sessions
        .snapshot(&id)
        .ok_or_else(|| ApiError::not_found("Unknown or expired session"))?;
    Ok(Json(StatePayload {
        created_at: state.sessions.created_at(&id),
        state: nav,
    }))
}

async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    let store = state.engine.store();
    Json(json!({
        "status": "ok",
        "service": "zorgkompas-web",
        "categories": store.categories().len(),
        "definitions": store.definitions().len(),
        "contacts": store.contacts().len(),
        "directories": store.directories().len(),
        "sessions": state.sessions.len(),
    }))
}

fn view_path(view: View) -> &'static str {
    match view {
        View::Overview => "/",
        View::CategoryDetail => "/categorie",
        View::Glossary => "/begrippen",
        View::Contacts => "/contacten",
        View::Directories => "/annuaires",
    }
}

fn list_href(view: View, query: &str) -> String {
    let path = view_path(view);
    let query = query.trim();
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?q={}", encode_uri_component(query))
    }
}

struct NavLink {
    href: &'static str,
    label: &'static str,
    active: bool,
}

struct CategoryCard {
    href: String,
    label_nl: String,
    label_fr: String,
    description: String,
}

struct CategoryPanel {
    label_nl: String,
    label_fr: String,
    description: String,
    definitions: Vec<DefinitionCard>,
    contacts: Vec<ContactCard>,
}

struct DefinitionCard {
    key: String,
    term_nl: String,
    term_fr: String,
    uitleg: String,
    url: String,
    read_in_dutch: String,
}

struct ContactCard {
    key: String,
    naam: String,
    nummer: String,
    tel_href: String,
    has_email: bool,
    email: String,
    details: String,
    tijden: String,
}

struct DirectoryCard {
    key: String,
    naam: String,
    uitleg: String,
    url: String,
    read_in_dutch: String,
}

impl CategoryCard {
    fn new(engine: &SearchEngine<'_>, category: &Category) -> Self {
        Self {
            href: format!("/categorie?id={}", encode_uri_component(&category.id)),
            label_nl: engine.normalize(Some(&category.label_nl)),
            label_fr: engine.normalize(Some(&category.label_fr)),
            description: engine.normalize(Some(&category.description)),
        }
    }
}

impl CategoryPanel {
    fn new(engine: &SearchEngine<'_>, category: &Category) -> Self {
        let store = engine.store();
        Self {
            label_nl: engine.normalize(Some(&category.label_nl)),
            label_fr: engine.normalize(Some(&category.label_fr)),
            description: engine.normalize(Some(&category.description)),
            definitions: store
                .related_definitions(category)
                .map(|entry| DefinitionCard::new(engine, entry))
                .collect(),
            contacts: store
                .related_contacts(category)
                .map(|entry| ContactCard::new(engine, entry))
                .collect(),
        }
    }
}

impl DefinitionCard {
    fn new(engine: &SearchEngine<'_>, entry: &Entry<Definition>) -> Self {
        let record = &entry.record;
        Self {
            key: entry.key.clone(),
            term_nl: engine.normalize(Some(&record.term_nl)),
            term_fr: engine.normalize(Some(&record.term_fr)),
            uitleg: engine.normalize(Some(&record.uitleg)),
            url: record.url.clone(),
            read_in_dutch: dutch_reading_link(&record.url),
        }
    }
}

impl ContactCard {
    fn new(engine: &SearchEngine<'_>, entry: &Entry<Contact>) -> Self {
        let record = &entry.record;
        let nummer = engine.normalize(Some(&record.nummer));
        Self {
            key: entry.key.clone(),
            tel_href: format!(
                "tel:{}",
                nummer.chars().filter(|c| !c.is_whitespace()).collect::<String>()
            ),
            nummer,
            naam: engine.normalize(Some(&record.naam)),
            has_email: record.email.as_deref().is_some_and(|email| !email.trim().is_empty()),
            email: engine.normalize(record.email.as_deref()),
            details: engine.normalize(Some(&record.details)),
            tijden: engine.normalize(Some(&record.tijden)),
        }
    }
}

impl DirectoryCard {
    fn new(engine: &SearchEngine<'_>, entry: &Entry<DirectoryLink>) -> Self {
        let record = &entry.record;
        Self {
            key: entry.key.clone(),
            naam: engine.normalize(Some(&record.naam)),
            uitleg: engine.normalize(Some(&record.uitleg)),
            url: record.url.clone(),
            read_in_dutch: dutch_reading_link(&record.url),
        }
    }
}

fn render_dashboard(state: &AppState, nav: &NavigationState, scroll_reset: bool) -> String {
    let engine = state.engine;
    let store = engine.store();
    let view = nav.view();
    let mut page = DashboardTemplate {
        chrome: Chrome::default(),
        title: view.title_nl().to_string(),
        view: view.as_str(),
        base_url: &state.base_url,
        nav: [View::Overview, View::Glossary, View::Contacts, View::Directories]
            .into_iter()
            .map(|target| NavLink {
                href: view_path(target),
                label: target.title_nl(),
                active: target == view,
            })
            .collect(),
        search_action: "/zoeken",
        search_text: nav.search_text().to_string(),
        scroll_reset,
        categories: Vec::new(),
        emergency: Vec::new(),
        panel: None,
        definitions: Vec::new(),
        contacts: Vec::new(),
        directories: Vec::new(),
        result_count: 0,
        version: env!("CARGO_PKG_VERSION"),
    };

    match view {
        View::Overview => {
            page.categories = store
                .categories()
                .iter()
                .map(|category| CategoryCard::new(engine, category))
                .collect();
            page.emergency = store
                .emergency_contacts()
                .map(|entry| ContactCard::new(engine, entry))
                .collect();
            page.directories = store
                .directories()
                .iter()
                .map(|entry| DirectoryCard::new(engine, entry))
                .collect();
        }
        View::CategoryDetail => {
            page.panel = nav
                .selected_category(store)
                .map(|category| CategoryPanel::new(engine, category));
            if let Some(panel) = &page.panel {
                page.title = panel.label_nl.clone();
            }
        }
        View::Glossary | View::Contacts | View::Directories => {
            page.search_action = view_path(view);
            let results = engine.results_for(nav);
            page.definitions = results
                .definitions
                .iter()
                .map(|entry| DefinitionCard::new(engine, entry))
                .collect();
            page.contacts = results
                .contacts
                .iter()
                .map(|entry| ContactCard::new(engine, entry))
                .collect();
            page.directories = results
                .directories
                .iter()
                .map(|entry| DirectoryCard::new(engine, entry))
                .collect();
            page.result_count = match view {
                View::Glossary => page.definitions.len(),
                View::Contacts => page.contacts.len(),
                _ => page.directories.len(),
            };
        }
    }

    page.render()
        .unwrap_or_else(|err| render_error_page(err.to_string()))
}

fn render_error_page(message: impl Into<String>) -> String {
    let chrome = Chrome::default();
    let message = message.into();
    format!(
        r#"<!DOCTYPE html>
<html lang="nl">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Zorgkompas • Fout</title>
    <script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4"></script>
  </head>
  <body class="{body_class}">
    <main class="{main_class}">
      <h1 class="{headline_class}">Er ging iets mis</h1>
      <p class="{lede_class}">{message}</p>
      <a href="/" class="{button_class}">Terug naar het dashboard</a>
    </main>
  </body>
</html>"#,
        body_class = chrome.body_class,
        main_class = chrome.main_class,
        headline_class = chrome.headline_class,
        lede_class = chrome.lede_class,
        button_class = chrome.button_class,
        message = message,
    )
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="nl">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Zorgkompas • {{ title }}</title>
    <script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4"></script>
    <link rel="canonical" href="{{ base_url }}/">
  </head>
  <body class="{{ chrome.body_class }}" data-view="{{ view }}">
    <header class="{{ chrome.header_class }}">
      <div class="max-w-5xl mx-auto px-4 pt-6 pb-3">
        <p class="{{ chrome.eyebrow_class }}">Zorgkompas v{{ version }} • Ouderenzorg in Frankrijk</p>
        <h1 class="{{ chrome.headline_class }}">{{ title }}</h1>
      </div>
      <nav class="{{ chrome.nav_class }}">
        {% for link in nav %}
        <a href="{{ link.href }}" class="{% if link.active %}{{ chrome.nav_active_class }}{% else %}{{ chrome.nav_link_class }}{% endif %}">{{ link.label }}</a>
        {% endfor %}
      </nav>
    </header>
    <main class="{{ chrome.main_class }}">
      {% if view != "category-detail" %}
      <form action="{{ search_action }}" method="get" class="flex gap-2" role="search">
        <input type="search" name="q" value="{{ search_text }}" placeholder="Zoek in het Nederlands of Frans, bv. thuiszorg of EHPAD" class="{{ chrome.input_class }}" />
        <button type="submit" class="{{ chrome.button_class }}">Zoeken</button>
      </form>
      {% endif %}

      {% if view == "overview" %}
      <p class="{{ chrome.lede_class }}">Kies een onderwerp of zoek rechtstreeks in de begrippen, nummers en annuaires.</p>
      <div class="{{ chrome.grid_class }}">
        {% for card in categories %}
        <a href="{{ card.href }}" class="{{ chrome.card_class }}">
          <p class="text-xl font-semibold">{{ card.label_nl }}</p>
          <p class="text-sm italic text-stone-500">{{ card.label_fr }}</p>
          {% if card.description.len() > 0 %}<p class="text-stone-600">{{ card.description }}</p>{% endif %}
        </a>
        {% endfor %}
      </div>
      {% if emergency.len() > 0 %}
      <section id="nood" class="rounded-lg border border-red-300 bg-red-50 p-4 space-y-2">
        <h2 class="text-xl font-bold text-red-900">Nood of spoed?</h2>
        <p class="flex flex-wrap gap-2">
          {% for card in emergency %}
          <a href="{{ card.tel_href }}" class="rounded-full bg-white px-3 py-1 font-semibold text-red-900 shadow">{{ card.naam }}: {{ card.nummer }}</a>
          {% endfor %}
        </p>
        <p><a href="/contacten" class="{{ chrome.link_class }}">Bekijk alle nuttige nummers →</a></p>
      </section>
      {% endif %}
      {% if directories.len() > 0 %}
      <section id="eerste-loket" class="{{ chrome.card_class }} space-y-2">
        <h2 class="text-xl font-bold">Eerste loket in uw regio (CLIC / Point d'information local)</h2>
        <ul class="space-y-1">
          {% for card in directories %}
          <li><a href="{{ card.url }}" class="{{ chrome.link_class }}" rel="noopener" target="_blank">{{ card.naam }} →</a></li>
          {% endfor %}
        </ul>
        <p><a href="/annuaires" class="{{ chrome.link_class }}">Overzicht annuaires (NL-uitleg) →</a></p>
      </section>
      {% endif %}
      {% endif %}

      {% if view == "category-detail" %}
      {% match panel %}
      {% when Some with (panel) %}
      <section class="space-y-2">
        <p class="text-sm italic text-stone-500">{{ panel.label_fr }}</p>
        {% if panel.description.len() > 0 %}<p class="{{ chrome.lede_class }}">{{ panel.description }}</p>{% endif %}
      </section>
      {% if panel.definitions.len() > 0 %}
      <section class="space-y-3">
        <h2 class="text-xl font-semibold">Begrippen</h2>
        <div class="{{ chrome.grid_class }}">
          {% for card in panel.definitions %}
          <article id="definition-{{ card.key }}" class="{{ chrome.card_class }}">
            <p class="text-lg font-semibold">{{ card.term_nl }}</p>
            <p class="text-sm italic text-stone-500">{{ card.term_fr }}</p>
            <p>{{ card.uitleg }}</p>
            <p class="text-sm"><a href="{{ card.url }}" class="{{ chrome.link_class }}" rel="noopener" target="_blank">Officiële bron</a> • <a href="{{ card.read_in_dutch }}" class="{{ chrome.link_class }}" rel="noopener" target="_blank">Lees in het Nederlands</a></p>
          </article>
          {% endfor %}
        </div>
      </section>
      {% endif %}
      {% if panel.contacts.len() > 0 %}
      <section class="space-y-3">
        <h2 class="text-xl font-semibold">Nuttige nummers</h2>
        <div class="{{ chrome.grid_class }}">
          {% for card in panel.contacts %}
          <article id="contact-{{ card.key }}" class="{{ chrome.card_class }}">
            <p class="text-lg font-semibold">{{ card.naam }}</p>
            <p class="text-2xl font-bold"><a href="{{ card.tel_href }}" class="{{ chrome.link_class }}">{{ card.nummer }}</a></p>
            {% if card.has_email %}<p><a href="mailto:{{ card.email }}" class="{{ chrome.link_class }}">{{ card.email }}</a></p>{% endif %}
            <p>{{ card.details }}</p>
            <p class="text-sm text-stone-500">{{ card.tijden }}</p>
          </article>
          {% endfor %}
        </div>
      </section>
      {% endif %}
      {% when None %}
      <p>Dit onderwerp bestaat niet meer. <a href="/" class="{{ chrome.link_class }}">Terug naar het dashboard</a>.</p>
      {% endmatch %}
      {% endif %}

      {% if view == "glossary" || view == "contacts" || view == "directories" %}
      <p class="text-sm text-stone-500">{{ result_count }} resultaten{% if search_text.len() > 0 %} voor “{{ search_text }}”{% endif %}.</p>
      {% if result_count == 0 %}
      <p>Niets gevonden. Probeer een ander woord, in het Nederlands of in het Frans.</p>
      {% endif %}
      {% endif %}

      {% if view == "glossary" %}
      <div class="{{ chrome.grid_class }}">
        {% for card in definitions %}
        <article id="definition-{{ card.key }}" class="{{ chrome.card_class }}">
          <p class="text-lg font-semibold">{{ card.term_nl }}</p>
          <p class="text-sm italic text-stone-500">{{ card.term_fr }}</p>
          <p>{{ card.uitleg }}</p>
          <p class="text-sm"><a href="{{ card.url }}" class="{{ chrome.link_class }}" rel="noopener" target="_blank">Officiële bron</a> • <a href="{{ card.read_in_dutch }}" class="{{ chrome.link_class }}" rel="noopener" target="_blank">Lees in het Nederlands</a></p>
        </article>
        {% endfor %}
      </div>
      {% endif %}

      {% if view == "contacts" %}
      <div class="{{ chrome.grid_class }}">
        {% for card in contacts %}
        <article id="contact-{{ card.key }}" class="{{ chrome.card_class }}">
          <p class="text-lg font-semibold">{{ card.naam }}</p>
          <p class="text-2xl font-bold"><a href="{{ card.tel_href }}" class="{{ chrome.link_class }}">{{ card.nummer }}</a></p>
          {% if card.has_email %}<p><a href="mailto:{{ card.email }}" class="{{ chrome.link_class }}">{{ card.email }}</a></p>{% endif %}
          <p>{{ card.details }}</p>
          <p class="text-sm text-stone-500">{{ card.tijden }}</p>
        </article>
        {% endfor %}
      </div>
      {% endif %}

      {% if view == "directories" %}
      <div class="{{ chrome.grid_class }}">
        {% for card in directories %}
        <article id="directory-{{ card.key }}" class="{{ chrome.card_class }}">
          <p class="text-lg font-semibold">{{ card.naam }}</p>
          <p>{{ card.uitleg }}</p>
          <p class="text-sm"><a href="{{ card.url }}" class="{{ chrome.link_class }}" rel="noopener" target="_blank">Open annuaire</a> • <a href="{{ card.read_in_dutch }}" class="{{ chrome.link_class }}" rel="noopener" target="_blank">Lees in het Nederlands</a></p>
        </article>
        {% endfor %}
      </div>
      {% endif %}
    </main>
    {% if scroll_reset %}
    <script>window.scrollTo(0, 0);</script>
    {% endif %}
  </body>
</html>"#,
    ext = "html"
)]
struct DashboardTemplate<'a> {
    chrome: Chrome,
    title: String,
    view: &'static str,
    base_url: &'a str,
    nav: Vec<NavLink>,
    search_action: &'static str,
    search_text: String,
    scroll_reset: bool,
    categories: Vec<CategoryCard>,
    emergency: Vec<ContactCard>,
    panel: Option<CategoryPanel>,
    definitions: Vec<DefinitionCard>,
    contacts: Vec<ContactCard>,
    directories: Vec<DirectoryCard>,
    result_count: usize,
    version: &'static str,
}

#[cfg(all(test, feature = "web"))]
mod tests {
    use super::*;
    use axum::{body, body::Body, http::Request, http::header::LOCATION};
    use tower::ServiceExt;

    fn test_router() -> Router {
        let state = Arc::new(AppState {
            engine: SearchEngine::embedded(),
            sessions: SessionRegistry::new(),
            base_url: "http://127.0.0.1:8080".to_string(),
        });
        build_router(state)
    }

    async fn body_text(response: Response) -> String {
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn cookie_pair(response: &Response) -> String {
        let raw = response
            .headers()
            .get(SET_COOKIE)
            .expect("fresh visitors get a session cookie")
            .to_str()
            .unwrap();
        raw.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn overview_lists_categories_and_sets_a_cookie() {
        let response = test_router()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.status().is_success());
        assert!(cookie_pair(&response).starts_with("zk_session="));
        let html = body_text(response).await;
        assert!(html.contains("categorie?id=spoed"));
        assert!(html.contains(r#"data-view="overview""#));
    }

    #[tokio::test]
    async fn overview_shows_emergency_numbers_and_directories() {
        let response = test_router()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains("Nood of spoed?"));
        for number in ["tel:15", "tel:112", "tel:17", "tel:18"] {
            assert!(html.contains(number), "missing {number}");
        }
        assert!(html.contains("annuaire-points-dinformation-local"));
        assert!(html.contains("lannuaire.service-public.fr"));
        assert!(html.contains("Bekijk alle nuttige nummers"));
    }

    #[tokio::test]
    async fn scroll_resets_only_when_the_view_changes() {
        let router = test_router();
        let response = router
            .clone()
            .oneshot(Request::get("/begrippen").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let cookie = cookie_pair(&response);
        let html = body_text(response).await;
        assert!(html.contains("window.scrollTo(0, 0)"));

        let response = router
            .oneshot(
                Request::get("/begrippen?q=apa")
                    .header(COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains(r#"id="definition-apa""#));
        assert!(!html.contains("window.scrollTo(0, 0)"));
    }

    #[tokio::test]
    async fn glossary_search_uses_aliases() {
        let response = test_router()
            .oneshot(
                Request::get("/begrippen?q=verzorgingshuis")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_success());
        let html = body_text(response).await;
        assert!(html.contains(r#"id="definition-ehpad""#));
        assert!(html.contains("translate.google.com"));
        assert!(!html.contains("[cite"));
    }

    #[tokio::test]
    async fn category_detail_shows_related_contacts() {
        let response = test_router()
            .oneshot(
                Request::get("/categorie?id=spoed")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_success());
        let html = body_text(response).await;
        assert!(html.contains(r#"id="contact-samu""#));
        assert!(html.contains(r#"href="tel:15""#));
    }

    #[tokio::test]
    async fn unknown_category_redirects_home() {
        let response = test_router()
            .oneshot(
                Request::get("/categorie?id=bestaat-niet")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/");
    }

    #[tokio::test]
    async fn global_search_redirects_to_first_view_with_hits() {
        let router = test_router();
        let response = router
            .clone()
            .oneshot(Request::get("/zoeken?q=112").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/contacten?q=112");

        let response = router
            .oneshot(
                Request::get("/zoeken?q=thuiszorg")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/begrippen?q=thuiszorg"
        );
    }

    #[tokio::test]
    async fn api_search_returns_all_three_collections() {
        let response = test_router()
            .oneshot(
                Request::get("/api/search?q=thuiszorg")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_success());
        let payload: serde_json::Value =
            serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(payload["query"], "thuiszorg");
        let keys: Vec<_> = payload["definitions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["key"].as_str().unwrap().to_string())
            .collect();
        assert!(keys.contains(&"ssiad".to_string()));
        assert!(payload["directories"].is_array());
    }

    #[tokio::test]
    async fn api_expand_lists_synonyms() {
        let response = test_router()
            .oneshot(
                Request::get("/api/expand?q=Thuiszorg%20Parijs")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let payload: serde_json::Value =
            serde_json::from_str(&body_text(response).await).unwrap();
        let terms: Vec<_> = payload["terms"]
            .as_array()
            .unwrap()
            .iter()
            .map(|term| term.as_str().unwrap())
            .collect();
        assert!(terms.contains(&"thuiszorg parijs"));
        assert!(terms.contains(&"parijs"));
        assert!(terms.contains(&"ssiad"));
    }

    #[tokio::test]
    async fn session_state_follows_navigation() {
        let router = test_router();
        let response = router
            .clone()
            .oneshot(
                Request::get("/contacten?q=samu")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let cookie = cookie_pair(&response);

        let response = router
            .clone()
            .oneshot(
                Request::get("/api/state")
                    .header(COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_success());
        assert!(response.headers().get(SET_COOKIE).is_none());
        let payload: serde_json::Value =
            serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(payload["view"], "contacts");
        assert_eq!(payload["search_text"], "samu");

        let _ = router
            .clone()
            .oneshot(
                Request::get("/")
                    .header(COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let response = router
            .oneshot(
                Request::get("/api/state")
                    .header(COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let payload: serde_json::Value =
            serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(payload["view"], "overview");
        assert_eq!(payload["search_text"], "");
    }

    #[tokio::test]
    async fn api_state_without_cookie_is_not_found() {
        let response = test_router()
            .oneshot(Request::get("/api/state").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_reports_dataset_counts() {
        let response = test_router()
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let payload: serde_json::Value =
            serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(payload["status"], "ok");
        assert!(payload["definitions"].as_u64().unwrap() > 0);
    }

    #[test]
    fn session_cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; zk_session=abc123XYZ; other=1"),
        );
        assert_eq!(session_cookie(&headers).as_deref(), Some("abc123XYZ"));

        headers.insert(COOKIE, HeaderValue::from_static("zk_session=../../etc"));
        assert_eq!(session_cookie(&headers), None);
    }

    #[test]
    fn list_links_encode_the_query() {
        assert_eq!(list_href(View::Glossary, "  "), "/begrippen");
        assert_eq!(
            list_href(View::Directories, "maison de retraite"),
            "/annuaires?q=maison%20de%20retraite"
        );
    }
}
