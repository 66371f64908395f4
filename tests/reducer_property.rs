//! Property-based tests for the auth reducer

use proptest::prelude::*;

use traindesk_auth::auth::{reduce, AuthAction, AuthState};
use traindesk_auth::types::UserProfile;

fn sample_profile() -> UserProfile {
    UserProfile {
        id: Some(1),
        username: Some("coach.ana".to_string()),
        tipo_usuario: Some("Entrenador".to_string()),
        extra: serde_json::Map::new(),
    }
}

fn action_strategy() -> impl Strategy<Value = AuthAction> {
    prop_oneof![
        any::<bool>().prop_map(|is_authenticated| AuthAction::Initialize {
            is_authenticated,
            user: is_authenticated.then(sample_profile),
        }),
        Just(AuthAction::LoginRequest),
        Just(AuthAction::LoginSuccess {
            user: sample_profile(),
        }),
        "[a-z ]{1,24}".prop_map(|message| AuthAction::LoginError { message }),
        Just(AuthAction::Logout),
    ]
}

proptest! {
    /// `is_loading` is true only strictly between a LoginRequest and the
    /// next terminal login action.
    #[test]
    fn loading_is_confined_to_an_open_login_flow(actions in prop::collection::vec(action_strategy(), 0..32)) {
        let mut state = AuthState::default();
        let mut login_open = false;

        for action in actions {
            match &action {
                AuthAction::LoginRequest => login_open = true,
                AuthAction::LoginSuccess { .. }
                | AuthAction::LoginError { .. }
                | AuthAction::Initialize { .. } => login_open = false,
                AuthAction::Logout => {}
            }
            state = reduce(&state, action);
            prop_assert_eq!(state.is_loading, login_open);
        }
    }

    /// Initialization is monotone: once observed true it never flips back.
    #[test]
    fn initialized_is_monotone(actions in prop::collection::vec(action_strategy(), 0..32)) {
        let mut state = AuthState::default();
        let mut seen_initialized = false;

        for action in actions {
            state = reduce(&state, action);
            if seen_initialized {
                prop_assert!(state.is_initialized);
            }
            seen_initialized |= state.is_initialized;
        }
    }

    /// Logout always lands in the unauthenticated shape with no user.
    #[test]
    fn logout_postcondition(actions in prop::collection::vec(action_strategy(), 0..32)) {
        let mut state = AuthState::default();
        for action in actions {
            state = reduce(&state, action);
        }

        let state = reduce(&state, AuthAction::Logout);
        prop_assert!(!state.is_authenticated);
        prop_assert!(state.user.is_none());
    }

    /// A login error never authenticates, whatever came before it.
    #[test]
    fn login_error_never_authenticates_from_logged_out(message in "[a-z ]{1,24}") {
        let state = reduce(&AuthState::default(), AuthAction::LoginRequest);
        let state = reduce(&state, AuthAction::LoginError { message });
        prop_assert!(!state.is_authenticated);
        prop_assert!(state.error.is_some());
    }
}
