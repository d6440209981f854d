use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use chrono_tz::Tz;
use tokio::sync::Mutex;
use uuid::Uuid;

use std::{collections::HashMap, sync::Arc};

use crate::{auth, categories, expenses, reports, settings};
use engine::{Engine, NotificationDispatcher, Notifier, TracingNotifier};

pub(crate) type SharedNotifier = Arc<dyn Notifier>;
type Dispatchers = HashMap<Uuid, Arc<NotificationDispatcher<SharedNotifier>>>;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    /// Zone used for calendar filters and chart labels.
    pub timezone: Tz,
    pub(crate) notifier: SharedNotifier,
    /// Budget alert of every user who loaded `/home` since start-up.
    ///
    /// Entries live as long as the process: one small state machine per
    /// user, never evicted, so the alert session ends with a restart.
    dispatchers: Arc<Mutex<Dispatchers>>,
}

impl ServerState {
    pub fn new(engine: Engine, timezone: Tz) -> Self {
        Self::with_notifier(engine, timezone, Arc::new(TracingNotifier))
    }

    pub fn with_notifier(engine: Engine, timezone: Tz, notifier: SharedNotifier) -> Self {
        Self {
            engine: Arc::new(engine),
            timezone,
            notifier,
            dispatchers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The caller's budget alert; created armed on first use.
    pub(crate) async fn dispatcher(
        &self,
        user_id: Uuid,
    ) -> Arc<NotificationDispatcher<SharedNotifier>> {
        self.dispatchers
            .lock()
            .await
            .entry(user_id)
            .or_insert_with(|| Arc::new(NotificationDispatcher::new(self.notifier.clone())))
            .clone()
    }
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let session = state
        .engine
        .authenticate(auth_header.username(), auth_header.password())
        .await
        .map_err(|err| {
            tracing::debug!("rejected credentials: {err}");
            StatusCode::UNAUTHORIZED
        })?;

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/password", post(auth::change_password))
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/categories/{id}",
            put(categories::update).delete(categories::delete),
        )
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route(
            "/expenses/{id}",
            put(expenses::update).delete(expenses::delete),
        )
        .route("/settings", get(settings::get).put(settings::update))
        .route("/home", post(reports::home))
        .route("/report", post(reports::report))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/signup", post(auth::sign_up))
        .merge(protected)
        .with_state(state)
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}
