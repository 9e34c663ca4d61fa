// Mock catalog - local HTTP server standing in for the movie API and site.
//
// Serves the search/detail API and the login, search and film card pages with
// the same selectors and messages as the real product, so the suite can run
// offline.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use catalog_e2e::{Session, Settings, TestData};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::task::JoinHandle;

pub const MOCK_API_KEY: &str = "test-key";

/// Test data matching the mock catalog's content.
pub const MOCK_TEST_DATA: &str = r#"{
    "api_key": "test-key",
    "search_exact": "Интерстеллар",
    "search_partial": "Интер",
    "search_en": "Interstellar",
    "search_fake": "Фильмнесуществует12345",
    "search_invalid": "@#$%^&*",
    "valid_email": "viewer@example.com",
    "valid_phone": "+79990001122",
    "valid_password": "correct-horse"
}"#;

struct CatalogEntry {
    id: u64,
    name: &'static str,
    en_name: &'static str,
    year: i32,
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        id: 258687,
        name: "Интерстеллар",
        en_name: "Interstellar",
        year: 2014,
    },
    CatalogEntry {
        id: 447301,
        name: "Начало",
        en_name: "Inception",
        year: 2010,
    },
    CatalogEntry {
        id: 44745,
        name: "Интердевочка",
        en_name: "Intergirl",
        year: 1989,
    },
    CatalogEntry {
        id: 301,
        name: "Матрица",
        en_name: "The Matrix",
        year: 1999,
    },
];

fn matching(query: &str) -> Vec<&'static CatalogEntry> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    CATALOG
        .iter()
        .filter(|m| {
            m.name.to_lowercase().contains(&needle) || m.en_name.to_lowercase().contains(&needle)
        })
        .collect()
}

fn movie_json(m: &CatalogEntry) -> Value {
    json!({
        "id": m.id,
        "name": m.name,
        "enName": m.en_name,
        "year": m.year,
        "rating": { "kp": 8.0 }
    })
}

/// Mock server handle
pub struct MockCatalog {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl MockCatalog {
    /// Start the mock on a random available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/movie/search", get(search_movies))
            .route("/movie/{id}", get(get_movie))
            .route("/", get(home_page))
            .route("/login", get(login_page))
            .route("/film/{id}", get(film_page));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock catalog");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Mock catalog failed");
        });

        MockCatalog { addr, handle }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A session whose API and UI both point at this mock.
    pub fn session(&self) -> Session {
        let ini = format!(
            "[api]\nbase_url = {url}\n[ui]\nbase_url = {url}\n[report]\nresults_dir = {dir}\n",
            url = self.url(),
            dir = results_dir().display()
        );
        let settings = Settings::parse(&ini).expect("mock settings");
        let data = TestData::parse(MOCK_TEST_DATA).expect("mock test data");
        Session::new(settings, data)
    }

    pub fn shutdown(self) {
        self.handle.abort();
    }
}

pub fn results_dir() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_TARGET_TMPDIR")).join("e2e-results")
}

/// Check if Chrome is available
pub fn chrome_available() -> bool {
    eoka::stealth::patcher::find_chrome().is_ok()
}

// API

fn check_key(headers: &HeaderMap) -> Option<Response> {
    match headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        None => Some(
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "statusCode": 401, "message": "API key is missing" })),
            )
                .into_response(),
        ),
        Some(key) if key != MOCK_API_KEY => Some(
            (
                StatusCode::FORBIDDEN,
                Json(json!({ "statusCode": 403, "message": "API key is invalid" })),
            )
                .into_response(),
        ),
        Some(_) => None,
    }
}

async fn search_movies(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Response {
    if let Some(denied) = check_key(&headers) {
        return denied;
    }
    let query = params.get("query").map(String::as_str).unwrap_or("");
    let docs: Vec<Value> = matching(query).into_iter().map(movie_json).collect();
    let total = docs.len();
    Json(json!({
        "docs": docs,
        "total": total,
        "limit": 10,
        "page": 1,
        "pages": if total == 0 { 0 } else { 1 }
    }))
    .into_response()
}

async fn get_movie(headers: HeaderMap, Path(id): Path<u64>) -> Response {
    if let Some(denied) = check_key(&headers) {
        return denied;
    }
    match CATALOG.iter().find(|m| m.id == id) {
        Some(m) => Json(movie_json(m)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "statusCode": 404, "message": "Movie not found" })),
        )
            .into_response(),
    }
}

// Pages

async fn home_page() -> Html<String> {
    let titles: Vec<String> = CATALOG
        .iter()
        .map(|m| format!("[{:?}, {:?}]", m.name, m.en_name))
        .collect();
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Каталог</title></head>
<body>
  <form id="search-form">
    <input type="text" name="search" value="draft">
    <button type="submit">Найти</button>
  </form>
  <ul id="results"></ul>
  <script>
    const catalog = [{catalog}];
    document.getElementById('search-form').addEventListener('submit', (event) => {{
      event.preventDefault();
      const query = document.querySelector("input[name='search']").value.trim().toLowerCase();
      const results = document.getElementById('results');
      results.innerHTML = '';
      if (!query) return;
      for (const [name, enName] of catalog) {{
        if (name.toLowerCase().includes(query) || enName.toLowerCase().includes(query)) {{
          const li = document.createElement('li');
          li.className = 'movie-title';
          li.textContent = name;
          results.appendChild(li);
        }}
      }}
    }});
  </script>
</body>
</html>"#,
        catalog = titles.join(", ")
    ))
}

async fn login_page() -> Html<&'static str> {
    // The success marker is assembled at runtime so the word only appears in
    // the page after a successful login.
    Html(
        r#"<!DOCTYPE html>
<html>
<head><title>Вход</title></head>
<body>
  <div id="auth">
    <form id="login-form">
      <input type="text" name="login">
      <input type="password" name="password">
      <button type="submit">Войти</button>
    </form>
  </div>
  <script>
    const users = ['viewer@example.com', '+79990001122'];
    const password = 'correct-horse';
    const showError = (text) => {
      let banner = document.querySelector('.error-message');
      if (!banner) {
        banner = document.createElement('div');
        banner.className = 'error-message';
        document.getElementById('auth').appendChild(banner);
      }
      banner.textContent = text;
    };
    document.getElementById('login-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const login = document.querySelector("input[name='login']").value.trim();
      const secret = document.querySelector("input[name='password']").value;
      if (!login && !secret) return showError('Введите данные для входа');
      if (!secret) return showError('Введите пароль');
      if (!login) return showError('Введите email или телефон');
      if (!users.includes(login) || secret !== password) return showError('Неверные данные');
      const marker = 'log' + 'out';
      document.getElementById('auth').innerHTML =
        '<a class="' + marker + '" href="/' + marker + '">Выйти</a>';
    });
  </script>
</body>
</html>"#,
    )
}

const POSTER_SRC: &str =
    "data:image/gif;base64,R0lGODlhAQABAIAAAAAAAP///yH5BAEAAAAALAAAAAABAAEAAAIBRAA7";

async fn film_page(Path(id): Path<u64>) -> Response {
    let body = match id {
        258687 => format!(
            r#"<div class="film-card">
  <h1 class="film-title">Интерстеллар</h1>
  <div class="film-poster"><img src="{POSTER_SRC}" width="100" height="150" alt="poster"></div>
  <p class="film-description">Фантастический эпос о путешествии через червоточину.</p>
  <ul class="film-actors">
    <li class="actor" onclick="this.dataset.clicked = 'yes'">Мэттью МакКонахи</li>
  </ul>
  <button class="watch" disabled>Смотреть</button>
</div>"#
        ),
        447301 => format!(
            r#"<div class="film-card">
  <h1 class="film-title">Начало</h1>
  <div class="film-poster">
    <img src="{POSTER_SRC}" width="100" height="150" alt="poster">
    <img src="{POSTER_SRC}" width="100" height="150" alt="poster" style="display: none">
  </div>
  <ul class="film-actors">
    <li class="actor">Леонардо ДиКаприо</li>
    <li class="actor">Джозеф Гордон-Левитт</li>
  </ul>
  <button class="watch" disabled style="display: none">Смотреть</button>
</div>"#
        ),
        _ => {
            return (
                StatusCode::NOT_FOUND,
                Html(page("Не найдено", r#"<div class="error-message">Фильм не найден</div>"#)),
            )
                .into_response();
        }
    };
    Html(page("Фильм", &body)).into_response()
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>{}</title></head>\n<body>\n{}\n</body>\n</html>",
        title, body
    )
}
