use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use futures::future::BoxFuture;
use trivia_night::{
    config::AppConfig,
    dao::{
        models::{PlayerEntity, QuestionEntity, QuestionSummaryEntity, ThemeEntity},
        storage::{StorageError, StorageResult},
        trivia_store::{TriviaStore, memory::InMemoryTriviaStore},
    },
    dto::{
        phase::VisiblePhase,
        session::{SessionView, TeamView},
    },
    error::ServiceError,
    services::session_service,
    state::{AppState, SharedState, session::OptionLetter, state_machine::SessionPhase},
};

fn player(id: i64, name: &str, team: &str) -> PlayerEntity {
    PlayerEntity {
        id,
        player: name.into(),
        team_name: team.into(),
    }
}

fn question(id: i64, theme: &str, number: i32, correct: &str, used: bool) -> QuestionEntity {
    QuestionEntity {
        id,
        theme: theme.into(),
        question_number: number,
        question: format!("{theme} question {number}"),
        option_a: "first".into(),
        option_b: "second".into(),
        option_c: "third".into(),
        option_d: "fourth".into(),
        correct_option: correct.into(),
        used,
    }
}

fn seeded_store() -> InMemoryTriviaStore {
    InMemoryTriviaStore::new(
        vec![
            player(1, "A", "Red"),
            player(2, "B", "Red"),
            player(3, "C", "Blue"),
        ],
        vec![
            question(10, "Science", 2, "b", false),
            question(11, "Science", 1, " c ", true),
            question(20, "History", 1, "A", false),
            question(30, "Kids e Disney", 1, "D", false),
        ],
    )
}

/// Store double whose operations fail on demand.
#[derive(Clone, Default)]
struct FlakyStore {
    inner: InMemoryTriviaStore,
    fail_list_players: Arc<AtomicBool>,
    fail_detail: Arc<AtomicBool>,
    fail_list_questions: Arc<AtomicBool>,
    slow_list_questions: Arc<AtomicBool>,
    fail_mark_used: Arc<AtomicBool>,
}

const SLOW_QUERY: Duration = Duration::from_millis(300);

fn outage() -> StorageError {
    StorageError::unavailable(
        "store offline".to_string(),
        std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
    )
}

impl TriviaStore for FlakyStore {
    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        if self.fail_list_players.load(Ordering::SeqCst) {
            return Box::pin(async { Err(outage()) });
        }
        self.inner.list_players()
    }

    fn list_themes(&self) -> BoxFuture<'static, StorageResult<Vec<ThemeEntity>>> {
        self.inner.list_themes()
    }

    fn list_questions(
        &self,
        theme: String,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionSummaryEntity>>> {
        if self.fail_list_questions.load(Ordering::SeqCst) {
            return Box::pin(async { Err(outage()) });
        }
        let rows = self.inner.list_questions(theme);
        if self.slow_list_questions.load(Ordering::SeqCst) {
            return Box::pin(async move {
                tokio::time::sleep(SLOW_QUERY).await;
                rows.await
            });
        }
        rows
    }

    fn find_question(&self, id: i64) -> BoxFuture<'static, StorageResult<QuestionEntity>> {
        if self.fail_detail.load(Ordering::SeqCst) {
            return Box::pin(async { Err(outage()) });
        }
        self.inner.find_question(id)
    }

    fn mark_used(&self, id: i64) -> BoxFuture<'static, StorageResult<()>> {
        if self.fail_mark_used.load(Ordering::SeqCst) {
            return Box::pin(async { Err(outage()) });
        }
        self.inner.mark_used(id)
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.health_check()
    }
}

async fn state_with(store: Arc<dyn TriviaStore>) -> SharedState {
    state_with_config(store, AppConfig::default()).await
}

async fn state_with_config(store: Arc<dyn TriviaStore>, config: AppConfig) -> SharedState {
    let state = AppState::new(config);
    state.install_store(store).await;
    session_service::refresh_categories(&state).await.unwrap();
    state
}

async fn on_question(state: &SharedState, id: i64) -> SessionView {
    session_service::dismiss_rules(state).await.unwrap();
    session_service::open_categories(state).await.unwrap();
    session_service::pick_category(state, "Science".into())
        .await
        .unwrap();
    session_service::open_question(state, id).await.unwrap()
}

fn team<'a>(view: &'a SessionView, name: &str) -> &'a TeamView {
    view.teams
        .iter()
        .find(|team| team.name == name)
        .unwrap_or_else(|| panic!("team {name} missing"))
}

#[tokio::test]
async fn full_game_night_round_trip() {
    let store = seeded_store();
    let state = state_with(Arc::new(store.clone())).await;

    let view = session_service::dismiss_rules(&state).await.unwrap();
    assert_eq!(view.phase, VisiblePhase::Teams);

    let view = session_service::draw_teams(&state).await.unwrap();
    assert_eq!(view.teams.len(), 2);
    assert_eq!(team(&view, "Red").members, vec!["A", "B"]);
    assert_eq!(team(&view, "Blue").members, vec!["C"]);

    session_service::open_categories(&state).await.unwrap();
    let view = session_service::pick_category(&state, "Science".into())
        .await
        .unwrap();
    assert_eq!(view.phase, VisiblePhase::Numbers);
    let numbers = view.questions.iter().map(|q| q.number).collect::<Vec<_>>();
    assert_eq!(numbers, vec![1, 2]);

    let view = session_service::open_question(&state, 10).await.unwrap();
    assert_eq!(view.phase, VisiblePhase::Question);

    let view = session_service::select_option(&state, OptionLetter::B)
        .await
        .unwrap();
    let question = view.question.as_ref().unwrap();
    assert!(question.correct_answered);
    assert!(question.can_mark_used);

    let view = session_service::mark_used(&state).await.unwrap();
    assert_eq!(view.phase, VisiblePhase::Numbers);
    assert!(view.question.is_none());
    assert!(view.questions.iter().all(|q| q.used));

    let stored = store.list_questions("Science".into()).await.unwrap();
    assert!(stored.iter().any(|q| q.id == 10 && q.used));
}

#[tokio::test]
async fn categories_keep_pinned_theme_last() {
    let state = state_with(Arc::new(seeded_store())).await;
    let view = session_service::view(&state).await;
    assert_eq!(
        view.categories,
        vec!["History", "Science", "Kids e Disney"]
    );
}

#[tokio::test]
async fn score_button_is_additive_and_local() {
    let state = state_with(Arc::new(seeded_store())).await;
    session_service::dismiss_rules(&state).await.unwrap();
    let view = session_service::draw_teams(&state).await.unwrap();
    let red = team(&view, "Red").id;

    session_service::adjust_score(&state, red, None).await.unwrap();
    let view = session_service::adjust_score(&state, red, None)
        .await
        .unwrap();

    assert_eq!(team(&view, "Red").score, 20);
    assert_eq!(team(&view, "Blue").score, 0);
}

#[tokio::test]
async fn unknown_team_score_is_not_found() {
    let state = state_with(Arc::new(seeded_store())).await;
    session_service::dismiss_rules(&state).await.unwrap();
    let err = session_service::adjust_score(&state, 42, Some(5))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn lightning_round_routes_to_categories() {
    let state = state_with(Arc::new(seeded_store())).await;
    session_service::dismiss_rules(&state).await.unwrap();

    let view = session_service::toggle_lightning(&state).await.unwrap();
    assert_eq!(view.phase, VisiblePhase::Categories);
    assert!(view.lightning);

    session_service::view_scoreboard(&state).await.unwrap();
    let view = session_service::start_next_round(&state).await.unwrap();
    assert_eq!(view.phase, VisiblePhase::Categories);
    assert_eq!(view.round, 2);
    assert!(!view.lightning);
}

#[tokio::test]
async fn random_draw_lands_on_an_eligible_category() {
    let state = state_with(Arc::new(seeded_store())).await;
    session_service::dismiss_rules(&state).await.unwrap();
    session_service::open_categories(&state).await.unwrap();

    let view = session_service::draw_category(&state).await.unwrap();
    assert_eq!(view.phase, VisiblePhase::Numbers);
    let drawn = view.current_category.unwrap();
    assert!(drawn == "History" || drawn == "Science");
}

#[tokio::test]
async fn random_draw_without_eligible_category_is_a_no_op() {
    let store = InMemoryTriviaStore::new(
        Vec::new(),
        vec![question(30, "Kids e Disney", 1, "D", false)],
    );
    let state = state_with(Arc::new(store)).await;
    session_service::dismiss_rules(&state).await.unwrap();
    session_service::open_categories(&state).await.unwrap();

    let view = session_service::draw_category(&state).await.unwrap();
    assert_eq!(view.phase, VisiblePhase::Categories);
    assert!(!view.can_draw_category);
    assert!(view.current_category.is_none());
}

#[tokio::test]
async fn random_draw_off_the_category_screen_is_rejected() {
    let store = InMemoryTriviaStore::new(
        Vec::new(),
        vec![question(30, "Kids e Disney", 1, "D", false)],
    );
    let state = state_with(Arc::new(store)).await;
    session_service::dismiss_rules(&state).await.unwrap();

    let err = session_service::draw_category(&state).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition(_)));
    assert_eq!(state.phase().await, SessionPhase::Teams);
}

#[tokio::test]
async fn used_question_cannot_be_reopened() {
    let state = state_with(Arc::new(seeded_store())).await;
    session_service::dismiss_rules(&state).await.unwrap();
    session_service::open_categories(&state).await.unwrap();
    session_service::pick_category(&state, "Science".into())
        .await
        .unwrap();

    let err = session_service::open_question(&state, 11).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
    let err = session_service::open_question(&state, 20).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    assert_eq!(state.phase().await, SessionPhase::Numbers);
}

#[tokio::test]
async fn mark_used_waits_for_the_answer() {
    let state = state_with(Arc::new(seeded_store())).await;
    on_question(&state, 10).await;

    let err = session_service::mark_used(&state).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));

    session_service::select_option(&state, OptionLetter::A)
        .await
        .unwrap();
    let view = session_service::reveal_answer(&state).await.unwrap();
    let question = view.question.as_ref().unwrap();
    assert!(question.revealed);
    assert!(question.can_mark_used);
}

#[tokio::test]
async fn failed_write_keeps_the_question_on_screen() {
    let store = FlakyStore {
        inner: seeded_store(),
        ..FlakyStore::default()
    };
    let state = state_with(Arc::new(store.clone())).await;
    on_question(&state, 10).await;
    session_service::select_option(&state, OptionLetter::B)
        .await
        .unwrap();

    store.fail_mark_used.store(true, Ordering::SeqCst);
    let err = session_service::mark_used(&state).await.unwrap_err();
    assert!(matches!(err, ServiceError::Unavailable(_)));

    let view = session_service::view(&state).await;
    assert_eq!(view.phase, VisiblePhase::Question);
    assert!(!view.loading);
    assert!(view.question.unwrap().correct_answered);
}

#[tokio::test]
async fn failed_refetch_flags_the_question_locally() {
    let store = FlakyStore {
        inner: seeded_store(),
        ..FlakyStore::default()
    };
    let state = state_with(Arc::new(store.clone())).await;
    on_question(&state, 10).await;
    session_service::select_option(&state, OptionLetter::B)
        .await
        .unwrap();

    store.fail_list_questions.store(true, Ordering::SeqCst);
    let view = session_service::mark_used(&state).await.unwrap();

    assert_eq!(view.phase, VisiblePhase::Numbers);
    assert!(view.questions.iter().any(|q| q.id == 10 && q.used));
}

#[tokio::test]
async fn slow_refetch_still_leaves_the_question() {
    let store = FlakyStore {
        inner: seeded_store(),
        ..FlakyStore::default()
    };
    let config = AppConfig {
        transition_timeout: Duration::from_millis(100),
        ..AppConfig::default()
    };
    let state = state_with_config(Arc::new(store.clone()), config).await;
    on_question(&state, 10).await;
    session_service::select_option(&state, OptionLetter::B)
        .await
        .unwrap();

    store.slow_list_questions.store(true, Ordering::SeqCst);
    let view = session_service::mark_used(&state).await.unwrap();

    assert_eq!(view.phase, VisiblePhase::Numbers);
    assert!(!view.loading);
    assert!(view.question.is_none());
    assert!(view.questions.iter().any(|q| q.id == 10 && q.used));
}

#[tokio::test]
async fn failed_team_draw_keeps_the_previous_teams() {
    let store = FlakyStore {
        inner: seeded_store(),
        ..FlakyStore::default()
    };
    let state = state_with(Arc::new(store.clone())).await;
    session_service::dismiss_rules(&state).await.unwrap();
    let view = session_service::draw_teams(&state).await.unwrap();
    let red = team(&view, "Red").id;
    let before = session_service::adjust_score(&state, red, None)
        .await
        .unwrap();

    store.fail_list_players.store(true, Ordering::SeqCst);
    let err = session_service::draw_teams(&state).await.unwrap_err();
    assert!(matches!(err, ServiceError::Unavailable(_)));

    let view = session_service::view(&state).await;
    assert_eq!(view.phase, VisiblePhase::Teams);
    assert!(!view.loading);
    assert!(view.teams_loaded);
    assert_eq!(view.teams.len(), before.teams.len());
    assert_eq!(team(&view, "Red").score, 10);
    assert_eq!(team(&view, "Red").members, team(&before, "Red").members);
}

#[tokio::test]
async fn failed_category_pick_keeps_the_previous_grid() {
    let store = FlakyStore {
        inner: seeded_store(),
        ..FlakyStore::default()
    };
    let state = state_with(Arc::new(store.clone())).await;
    session_service::dismiss_rules(&state).await.unwrap();
    session_service::open_categories(&state).await.unwrap();
    let science = session_service::pick_category(&state, "Science".into())
        .await
        .unwrap();
    session_service::back_to_categories(&state).await.unwrap();

    store.fail_list_questions.store(true, Ordering::SeqCst);
    let err = session_service::pick_category(&state, "History".into())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Unavailable(_)));

    let view = session_service::view(&state).await;
    assert_eq!(view.phase, VisiblePhase::Categories);
    assert!(!view.loading);
    assert_eq!(view.current_category.as_deref(), Some("Science"));
    let ids = |view: &SessionView| view.questions.iter().map(|q| q.id).collect::<Vec<_>>();
    assert_eq!(ids(&view), ids(&science));
}

#[tokio::test]
async fn failed_detail_fetch_stays_on_numbers() {
    let store = FlakyStore {
        inner: seeded_store(),
        ..FlakyStore::default()
    };
    store.fail_detail.store(true, Ordering::SeqCst);
    let state = state_with(Arc::new(store)).await;
    session_service::dismiss_rules(&state).await.unwrap();
    session_service::open_categories(&state).await.unwrap();
    session_service::pick_category(&state, "Science".into())
        .await
        .unwrap();

    assert!(session_service::open_question(&state, 10).await.is_err());
    let view = session_service::view(&state).await;
    assert_eq!(view.phase, VisiblePhase::Numbers);
    assert!(view.question.is_none());
}

#[tokio::test]
async fn actions_needing_the_store_fail_while_degraded() {
    let state = AppState::new(AppConfig::default());
    session_service::dismiss_rules(&state).await.unwrap();

    let err = session_service::draw_teams(&state).await.unwrap_err();
    assert!(matches!(err, ServiceError::Degraded));
    let view = session_service::view(&state).await;
    assert!(view.degraded);
    assert!(!view.teams_loaded);
}

#[tokio::test]
async fn store_actions_broadcast_loading_then_settled_view() {
    let state = state_with(Arc::new(seeded_store())).await;
    session_service::dismiss_rules(&state).await.unwrap();
    let mut events = state.public_sse().subscribe();

    session_service::draw_teams(&state).await.unwrap();

    let loading = events.try_recv().unwrap();
    assert_eq!(loading.name, "session.updated");
    let loading: serde_json::Value = serde_json::from_str(&loading.data).unwrap();
    assert_eq!(loading["loading"], true);

    let settled = events.try_recv().unwrap();
    let settled: serde_json::Value = serde_json::from_str(&settled.data).unwrap();
    assert_eq!(settled["loading"], false);
    assert_eq!(settled["teams"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn actions_from_the_wrong_screen_are_rejected() {
    let state = state_with(Arc::new(seeded_store())).await;

    let err = session_service::draw_teams(&state).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition(_)));
    let err = session_service::select_option(&state, OptionLetter::A)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition(_)));
    assert_eq!(session_service::view(&state).await.phase, VisiblePhase::Rules);
}

#[tokio::test]
async fn bundled_seed_file_drives_a_session() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config/seed.json");
    let store = InMemoryTriviaStore::from_seed_file(&path).unwrap();
    let state = state_with(Arc::new(store)).await;

    session_service::dismiss_rules(&state).await.unwrap();
    let view = session_service::draw_teams(&state).await.unwrap();
    let names = view.teams.iter().map(|team| team.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["Azul", "Vermelho", "Sem time"]);
    assert_eq!(view.categories.last().map(String::as_str), Some("Kids e Disney"));
}
