use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

/// Genres every fresh server starts with.
pub const DEFAULT_GENRES: [&str; 5] = ["食費", "交通費", "日用品", "娯楽", "光熱費"];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub date: String,
    pub genre: String,
    pub amount: i64,
}

#[derive(Deserialize)]
pub struct NewExpense {
    pub date: String,
    pub genre: String,
    pub amount: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

#[derive(Deserialize)]
pub struct NewGenre {
    pub name: String,
}

/// `{message, error}` envelope. Both keys are always written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: Option<String>,
    pub error: Option<String>,
}

impl Message {
    fn ok(message: &str) -> Self {
        Self {
            message: Some(message.to_string()),
            error: None,
        }
    }

    fn err(error: &str) -> Self {
        Self {
            message: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Default)]
pub struct Store {
    expenses: BTreeMap<i64, Expense>,
    genres: BTreeMap<i64, Genre>,
    last_expense_id: i64,
    last_genre_id: i64,
}

impl Store {
    /// A store holding only `DEFAULT_GENRES`.
    pub fn seeded() -> Self {
        let mut store = Self::default();
        for name in DEFAULT_GENRES {
            store.insert_genre(name.to_string());
        }
        store
    }

    fn insert_genre(&mut self, name: String) -> i64 {
        self.last_genre_id += 1;
        let genre = Genre {
            id: self.last_genre_id,
            name,
            created_at: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
        };
        self.genres.insert(genre.id, genre);
        self.last_genre_id
    }

    fn insert_expense(&mut self, input: NewExpense) -> i64 {
        self.last_expense_id += 1;
        let expense = Expense {
            id: self.last_expense_id,
            date: input.date,
            genre: input.genre,
            amount: input.amount,
        };
        self.expenses.insert(expense.id, expense);
        self.last_expense_id
    }

    fn genre_named(&self, name: &str) -> bool {
        self.genres.values().any(|genre| genre.name == name)
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with_store(Store::seeded())
}

pub fn app_with_store(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/expenses", get(list_expenses).post(add_expense))
        .route("/expenses/{id}", delete(delete_expense))
        .route("/genres", get(list_genres).post(add_genre))
        .route("/genres/{id}", delete(delete_genre))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_expenses(State(db): State<Db>) -> Json<Vec<Expense>> {
    let store = db.read().await;
    Json(store.expenses.values().cloned().collect())
}

async fn add_expense(State(db): State<Db>, Json(input): Json<NewExpense>) -> Json<Message> {
    let mut store = db.write().await;
    if !store.genre_named(&input.genre) {
        return Json(Message::err("genre not found"));
    }
    let id = store.insert_expense(input);
    tracing::info!(id, "expense added");
    Json(Message::ok("ok"))
}

async fn delete_expense(State(db): State<Db>, Path(id): Path<i64>) -> Json<Message> {
    let removed = db.write().await.expenses.remove(&id).is_some();
    tracing::info!(id, removed, "expense deleted");
    Json(Message::ok("deleted"))
}

async fn list_genres(State(db): State<Db>) -> Json<Vec<Genre>> {
    let store = db.read().await;
    Json(store.genres.values().cloned().collect())
}

async fn add_genre(State(db): State<Db>, Json(input): Json<NewGenre>) -> Json<Message> {
    let mut store = db.write().await;
    if store.genre_named(&input.name) {
        return Json(Message::err("genre already exists"));
    }
    let id = store.insert_genre(input.name);
    tracing::info!(id, "genre added");
    Json(Message::ok("ok"))
}

async fn delete_genre(State(db): State<Db>, Path(id): Path<i64>) -> Json<Message> {
    let mut store = db.write().await;
    if let Some(genre) = store.genres.get(&id) {
        if store.expenses.values().any(|expense| expense.genre == genre.name) {
            return Json(Message::err("genre is in use"));
        }
    }
    let removed = store.genres.remove(&id).is_some();
    tracing::info!(id, removed, "genre deleted");
    Json(Message::ok("deleted"))
}
