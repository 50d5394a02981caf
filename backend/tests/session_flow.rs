//! Session protocol tests
//!
//! Drive `ClientSession`s directly over in-memory channels: joins, moves, concurrency,
//! leave and resign, asserting exactly which connection receives what.

use backend::registry::Connection;
use backend::session::{ClientSession, ConnectionState, SessionHandler};
use backend::store::{DataAccess, MemoryDataAccess, User};
use chess_engine::{Board, Color, Game, Move, Piece, PieceType, Position};
use shared::{GameId, JoinRole, ServerMessage, UserGameCommand};
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;

// ============================================================================
// Fixtures
// ============================================================================

struct Fixture {
    store: Arc<MemoryDataAccess>,
    handler: Arc<SessionHandler>,
    game_id: GameId,
    alice: String,
    bob: String,
    carol: String,
}

fn fixture() -> Fixture {
    let store = Arc::new(MemoryDataAccess::new());
    let mut tokens = Vec::new();
    for name in ["alice", "bob", "carol"] {
        store
            .create_user(&User {
                username: name.to_string(),
                email: format!("{name}@example.com"),
            })
            .unwrap();
        tokens.push(store.add_auth(name).unwrap().auth_token);
    }
    let game_id = store.create_game("test game");
    let handler = Arc::new(SessionHandler::new(store.clone()));

    let carol = tokens.pop().unwrap();
    let bob = tokens.pop().unwrap();
    let alice = tokens.pop().unwrap();
    Fixture {
        store,
        handler,
        game_id,
        alice,
        bob,
        carol,
    }
}

struct Client {
    session: ClientSession,
    inbox: Receiver<ServerMessage>,
    token: String,
}

impl Client {
    async fn send(&mut self, command: UserGameCommand) {
        self.session.handle_command(command).await;
    }

    async fn join(&mut self, game_id: GameId, role: Option<JoinRole>) {
        let command = UserGameCommand::Connect {
            auth_token: self.token.clone(),
            game_id,
            role,
        };
        self.send(command).await;
    }

    async fn play(&mut self, game_id: GameId, from: &str, to: &str) {
        let command = UserGameCommand::MakeMove {
            auth_token: self.token.clone(),
            game_id,
            chess_move: Move::new(sq(from), sq(to)),
        };
        self.send(command).await;
    }

    /// Everything queued for this connection so far
    fn drain(&mut self) -> Vec<ServerMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = self.inbox.try_recv() {
            messages.push(message);
        }
        messages
    }
}

impl Fixture {
    fn client(&self, token: &str) -> Client {
        self.client_with_capacity(token, 32)
    }

    fn client_with_capacity(&self, token: &str, capacity: usize) -> Client {
        let (connection, inbox) = Connection::channel(capacity);
        Client {
            session: self.handler.open(connection),
            inbox,
            token: token.to_string(),
        }
    }

    /// alice as white, bob as black, carol observing; inboxes drained
    async fn seated_game(&self) -> (Client, Client, Client) {
        let mut white = self.client(&self.alice);
        let mut black = self.client(&self.bob);
        let mut observer = self.client(&self.carol);
        white.join(self.game_id, Some(JoinRole::White)).await;
        black.join(self.game_id, Some(JoinRole::Black)).await;
        observer.join(self.game_id, None).await;
        white.drain();
        black.drain();
        observer.drain();
        (white, black, observer)
    }

    async fn game(&self) -> Game {
        self.store.get_game(self.game_id).await.unwrap().game
    }
}

fn sq(name: &str) -> Position {
    let bytes = name.as_bytes();
    Position::new(bytes[1] - b'0', bytes[0] - b'a' + 1).unwrap()
}

fn notifications(messages: &[ServerMessage]) -> Vec<&str> {
    messages
        .iter()
        .filter_map(|m| match m {
            ServerMessage::Notification { message } => Some(message.as_str()),
            _ => None,
        })
        .collect()
}

fn errors(messages: &[ServerMessage]) -> Vec<&str> {
    messages
        .iter()
        .filter_map(|m| match m {
            ServerMessage::Error { error_message } => Some(error_message.as_str()),
            _ => None,
        })
        .collect()
}

fn load_games(messages: &[ServerMessage]) -> Vec<&Game> {
    messages
        .iter()
        .filter_map(|m| match m {
            ServerMessage::LoadGame { game } => Some(game),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Joining
// ============================================================================

#[tokio::test]
async fn test_join_as_player_claims_seat_and_notifies_others() {
    let fx = fixture();
    let mut observer = fx.client(&fx.carol);
    observer.join(fx.game_id, Some(JoinRole::Observer)).await;
    assert_eq!(load_games(&observer.drain()).len(), 1);

    let mut white = fx.client(&fx.alice);
    white.join(fx.game_id, Some(JoinRole::White)).await;

    let joined = white.drain();
    assert_eq!(joined.len(), 1);
    assert_eq!(load_games(&joined), vec![&Game::new()]);
    assert_eq!(notifications(&observer.drain()), vec!["alice joined as white"]);

    let session = fx.store.get_game(fx.game_id).await.unwrap();
    assert_eq!(session.white_username.as_deref(), Some("alice"));
    assert_eq!(session.black_username, None);
    assert_eq!(fx.handler.registry().connection_count(fx.game_id), 2);
    assert!(matches!(
        white.session.state(),
        ConnectionState::Joined { role: JoinRole::White, .. }
    ));
}

#[tokio::test]
async fn test_join_without_role_observes() {
    let fx = fixture();
    let mut client = fx.client(&fx.carol);
    client.join(fx.game_id, None).await;

    assert_eq!(load_games(&client.drain()).len(), 1);
    let session = fx.store.get_game(fx.game_id).await.unwrap();
    assert_eq!(session.white_username, None);
    assert_eq!(session.black_username, None);
}

#[tokio::test]
async fn test_taken_seat_is_rejected() {
    let fx = fixture();
    let mut white = fx.client(&fx.alice);
    white.join(fx.game_id, Some(JoinRole::White)).await;
    white.drain();

    let mut intruder = fx.client(&fx.bob);
    intruder.join(fx.game_id, Some(JoinRole::White)).await;

    assert_eq!(
        errors(&intruder.drain()),
        vec!["Error: the white seat is already taken"]
    );
    assert!(white.drain().is_empty());
    assert_eq!(intruder.session.state(), &ConnectionState::Unjoined);
    assert_eq!(fx.handler.registry().connection_count(fx.game_id), 1);
}

#[tokio::test]
async fn test_same_user_may_rejoin_own_seat() {
    let fx = fixture();
    let mut first = fx.client(&fx.alice);
    let mut second = fx.client(&fx.alice);
    first.join(fx.game_id, Some(JoinRole::White)).await;
    second.join(fx.game_id, Some(JoinRole::White)).await;

    assert_eq!(load_games(&second.drain()).len(), 1);
    assert_eq!(fx.handler.registry().connection_count(fx.game_id), 2);
}

#[tokio::test]
async fn test_bad_token_and_unknown_game() {
    let fx = fixture();
    let mut stranger = fx.client("not-a-token");
    stranger.join(fx.game_id, None).await;
    assert_eq!(errors(&stranger.drain()), vec!["Error: unauthorized"]);

    let mut lost = fx.client(&fx.alice);
    lost.join(99, Some(JoinRole::White)).await;
    assert_eq!(errors(&lost.drain()), vec!["Error: game 99 does not exist"]);
    assert_eq!(fx.handler.registry().game_count(), 0);
}

#[tokio::test]
async fn test_failed_joins_leave_no_locks_behind() {
    let fx = fixture();
    let mut lost = fx.client(&fx.alice);
    for game_id in 1000..1100 {
        lost.join(game_id, Some(JoinRole::White)).await;
    }
    assert_eq!(errors(&lost.drain()).len(), 100);
    assert!(fx.handler.locks().is_empty());

    // Seat held by a disconnected player
    let mut white = fx.client(&fx.alice);
    white.join(fx.game_id, Some(JoinRole::White)).await;
    assert_eq!(fx.handler.locks().len(), 1);
    white.session.close().await;
    assert!(fx.handler.locks().is_empty());

    let mut intruder = fx.client(&fx.bob);
    intruder.join(fx.game_id, Some(JoinRole::White)).await;
    assert_eq!(
        errors(&intruder.drain()),
        vec!["Error: the white seat is already taken"]
    );
    assert!(fx.handler.locks().is_empty());
}

#[tokio::test]
async fn test_second_join_requires_leave() {
    let fx = fixture();
    let other_game = fx.store.create_game("other");
    let mut client = fx.client(&fx.carol);
    client.join(fx.game_id, None).await;
    client.drain();

    client.join(other_game, None).await;

    let errs = client.drain();
    assert_eq!(errors(&errs).len(), 1);
    assert!(errors(&errs)[0].contains("leave it first"));
    assert_eq!(fx.handler.registry().connection_count(other_game), 0);
}

#[tokio::test]
async fn test_malformed_text_is_rejected() {
    let fx = fixture();
    let mut client = fx.client(&fx.alice);
    client.session.handle_text("{\"commandType\":\"DANCE\"}").await;

    let errs = client.drain();
    assert_eq!(errors(&errs).len(), 1);
    assert!(errors(&errs)[0].starts_with("Error: malformed command"));
}

// ============================================================================
// Moves
// ============================================================================

#[tokio::test]
async fn test_move_broadcasts_state_and_description() {
    let fx = fixture();
    let (mut white, mut black, mut observer) = fx.seated_game().await;

    white.play(fx.game_id, "e2", "e4").await;

    let to_mover = white.drain();
    assert_eq!(load_games(&to_mover).len(), 1);
    assert!(notifications(&to_mover).is_empty());

    for client in [&mut black, &mut observer] {
        let received = client.drain();
        let games = load_games(&received);
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].turn(), Color::Black);
        assert!(games[0].board().is_empty(sq("e2")));
        assert_eq!(notifications(&received), vec!["alice moved e2 to e4"]);
    }

    let stored = fx.game().await;
    assert_eq!(stored.turn(), Color::Black);
    assert_eq!(
        stored.board().piece_at(sq("e4")),
        Some(Piece::new(Color::White, PieceType::Pawn))
    );
}

#[tokio::test]
async fn test_rejected_moves_only_answer_the_sender() {
    let fx = fixture();
    let (mut white, mut black, mut observer) = fx.seated_game().await;

    // Black first
    black.play(fx.game_id, "e7", "e5").await;
    assert_eq!(
        errors(&black.drain()),
        vec!["Error: it is white's turn, the piece at e7 belongs to black"]
    );

    // Someone else's pieces
    white.play(fx.game_id, "e7", "e5").await;
    assert_eq!(
        errors(&white.drain()),
        vec!["Error: you do not control the black pieces"]
    );

    // Observers hold no seat
    observer.play(fx.game_id, "e2", "e4").await;
    assert_eq!(
        errors(&observer.drain()),
        vec!["Error: you do not control the white pieces"]
    );

    // Not a legal pawn move
    white.play(fx.game_id, "e2", "e5").await;
    assert_eq!(
        errors(&white.drain()),
        vec!["Error: illegal move from e2 to e5"]
    );

    assert!(black.drain().is_empty());
    assert!(observer.drain().is_empty());
    assert_eq!(fx.game().await, Game::new());
}

#[tokio::test]
async fn test_move_before_join_is_rejected() {
    let fx = fixture();
    let mut client = fx.client(&fx.alice);
    client.play(fx.game_id, "e2", "e4").await;
    assert_eq!(errors(&client.drain()), vec!["Error: join a game first"]);
}

#[tokio::test]
async fn test_move_with_foreign_token_is_unauthorized() {
    let fx = fixture();
    let (mut white, _black, _observer) = fx.seated_game().await;

    white
        .send(UserGameCommand::MakeMove {
            auth_token: fx.bob.clone(),
            game_id: fx.game_id,
            chess_move: Move::new(sq("e2"), sq("e4")),
        })
        .await;
    assert_eq!(errors(&white.drain()), vec!["Error: unauthorized"]);
}

#[tokio::test]
async fn test_checkmate_ends_game() {
    let fx = fixture();
    let (mut white, mut black, mut observer) = fx.seated_game().await;

    white.play(fx.game_id, "f2", "f3").await;
    black.play(fx.game_id, "e7", "e5").await;
    white.play(fx.game_id, "g2", "g4").await;
    black.play(fx.game_id, "d8", "h4").await;

    let received = observer.drain();
    assert_eq!(
        notifications(&received).last().copied(),
        Some("alice (white) is checkmated, bob (black) wins")
    );
    assert!(load_games(&received).last().unwrap().is_game_over());
    assert!(fx.game().await.is_game_over());

    white.drain();
    white.play(fx.game_id, "a2", "a3").await;
    assert_eq!(errors(&white.drain()), vec!["Error: game is already over"]);
}

#[tokio::test]
async fn test_stalemate_is_announced_as_draw() {
    let fx = fixture();
    let mut board = Board::empty();
    board.add_piece(sq("h1"), Piece::new(Color::White, PieceType::King));
    board.add_piece(sq("f2"), Piece::new(Color::Black, PieceType::King));
    board.add_piece(sq("g4"), Piece::new(Color::Black, PieceType::Queen));
    let mut session = fx.store.get_game(fx.game_id).await.unwrap();
    session.game = Game::from_board(board, Color::Black);
    fx.store.update_game(&session).await.unwrap();

    let (mut white, mut black, mut observer) = fx.seated_game().await;
    black.play(fx.game_id, "g4", "g3").await;

    let expected = Some("alice (white) is stalemated, the game is a draw");
    for client in [&mut white, &mut black, &mut observer] {
        assert_eq!(notifications(&client.drain()).last().copied(), expected);
    }
    assert!(fx.game().await.is_game_over());

    white.play(fx.game_id, "h1", "h2").await;
    assert_eq!(errors(&white.drain()), vec!["Error: game is already over"]);
}

#[tokio::test]
async fn test_check_is_announced_to_everyone() {
    let fx = fixture();
    let (mut white, mut black, _observer) = fx.seated_game().await;

    white.play(fx.game_id, "e2", "e4").await;
    black.play(fx.game_id, "f7", "f6").await;
    white.play(fx.game_id, "d1", "h5").await;

    let to_mover = white.drain();
    assert_eq!(
        notifications(&to_mover).last().copied(),
        Some("bob (black) is in check")
    );
    assert_eq!(
        notifications(&black.drain()).last().copied(),
        Some("bob (black) is in check")
    );
}

#[tokio::test]
async fn test_promotion_requires_piece() {
    let fx = fixture();
    let mut board = Board::empty();
    board.add_piece(sq("e1"), Piece::new(Color::White, PieceType::King));
    board.add_piece(sq("h6"), Piece::new(Color::Black, PieceType::King));
    board.add_piece(sq("a7"), Piece::new(Color::White, PieceType::Pawn));
    let mut session = fx.store.get_game(fx.game_id).await.unwrap();
    session.game = Game::from_board(board, Color::White);
    fx.store.update_game(&session).await.unwrap();

    let (mut white, _black, _observer) = fx.seated_game().await;

    white.play(fx.game_id, "a7", "a8").await;
    assert_eq!(
        errors(&white.drain()),
        vec!["Error: move from a7 to a8 needs a promotion piece"]
    );

    white
        .send(UserGameCommand::MakeMove {
            auth_token: fx.alice.clone(),
            game_id: fx.game_id,
            chess_move: Move::with_promotion(sq("a7"), sq("a8"), PieceType::Queen),
        })
        .await;
    let received = white.drain();
    let games = load_games(&received);
    assert_eq!(games.len(), 1);
    assert_eq!(
        games[0].board().piece_at(sq("a8")),
        Some(Piece::new(Color::White, PieceType::Queen))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_moves_apply_exactly_once() {
    let fx = fixture();
    let mut first = fx.client(&fx.alice);
    let mut second = fx.client(&fx.alice);
    first.join(fx.game_id, Some(JoinRole::White)).await;
    second.join(fx.game_id, Some(JoinRole::White)).await;
    first.drain();
    second.drain();

    let e4 = UserGameCommand::MakeMove {
        auth_token: fx.alice.clone(),
        game_id: fx.game_id,
        chess_move: Move::new(sq("e2"), sq("e4")),
    };
    let d4 = UserGameCommand::MakeMove {
        auth_token: fx.alice.clone(),
        game_id: fx.game_id,
        chess_move: Move::new(sq("d2"), sq("d4")),
    };
    tokio::join!(first.send(e4), second.send(d4));

    let mut all = first.drain();
    all.extend(second.drain());
    assert_eq!(errors(&all).len(), 1);

    let stored = fx.game().await;
    assert_eq!(stored.turn(), Color::Black);
    let e_moved = stored.board().is_empty(sq("e2"));
    let d_moved = stored.board().is_empty(sq("d2"));
    assert!(e_moved ^ d_moved, "exactly one pawn should have moved");
}

// ============================================================================
// Leave, resign, close
// ============================================================================

#[tokio::test]
async fn test_leave_clears_only_the_leavers_seat() {
    let fx = fixture();
    let (mut white, mut black, mut observer) = fx.seated_game().await;

    white
        .send(UserGameCommand::Leave {
            auth_token: fx.alice.clone(),
            game_id: fx.game_id,
        })
        .await;

    assert!(white.drain().is_empty());
    assert_eq!(notifications(&black.drain()), vec!["alice left the game"]);
    assert_eq!(notifications(&observer.drain()), vec!["alice left the game"]);

    let session = fx.store.get_game(fx.game_id).await.unwrap();
    assert_eq!(session.white_username, None);
    assert_eq!(session.black_username.as_deref(), Some("bob"));
    assert!(!session.game.is_game_over());

    assert_eq!(white.session.state(), &ConnectionState::Unjoined);
    assert!(!fx.handler.registry().contains(fx.game_id, white.session.id()));

    // The seat can be taken again
    let mut replacement = fx.client(&fx.carol);
    replacement.join(fx.game_id, Some(JoinRole::White)).await;
    assert!(errors(&replacement.drain()).is_empty());
}

#[tokio::test]
async fn test_resign_ends_game_and_skips_resigner() {
    let fx = fixture();
    let (mut white, mut black, mut observer) = fx.seated_game().await;

    black
        .send(UserGameCommand::Resign {
            auth_token: fx.bob.clone(),
            game_id: fx.game_id,
        })
        .await;

    assert!(black.drain().is_empty());
    let expected = vec!["bob resigned, alice (white) wins"];
    assert_eq!(notifications(&white.drain()), expected);
    assert_eq!(notifications(&observer.drain()), expected);
    assert!(fx.game().await.is_game_over());
    assert_eq!(black.session.state(), &ConnectionState::Unjoined);
    assert_eq!(fx.handler.registry().connection_count(fx.game_id), 2);

    white
        .send(UserGameCommand::Resign {
            auth_token: fx.alice.clone(),
            game_id: fx.game_id,
        })
        .await;
    assert_eq!(errors(&white.drain()), vec!["Error: game is already over"]);
}

#[tokio::test]
async fn test_move_after_resign_is_rejected() {
    let fx = fixture();
    let (mut white, mut black, mut observer) = fx.seated_game().await;

    black
        .send(UserGameCommand::Resign {
            auth_token: fx.bob.clone(),
            game_id: fx.game_id,
        })
        .await;
    white.drain();
    observer.drain();

    white.play(fx.game_id, "e2", "e4").await;
    assert_eq!(errors(&white.drain()), vec!["Error: game is already over"]);
    assert!(observer.drain().is_empty());
    assert!(black.drain().is_empty());
    assert!(fx.game().await.board().is_empty(sq("e4")));
}

#[tokio::test]
async fn test_observer_cannot_resign() {
    let fx = fixture();
    let (mut white, _black, mut observer) = fx.seated_game().await;

    observer
        .send(UserGameCommand::Resign {
            auth_token: fx.carol.clone(),
            game_id: fx.game_id,
        })
        .await;

    assert_eq!(
        errors(&observer.drain()),
        vec!["Error: observers cannot resign"]
    );
    assert!(white.drain().is_empty());
    assert!(!fx.game().await.is_game_over());
}

#[tokio::test]
async fn test_wrong_game_id_is_rejected() {
    let fx = fixture();
    let (mut white, _black, _observer) = fx.seated_game().await;

    white
        .send(UserGameCommand::Leave {
            auth_token: fx.alice.clone(),
            game_id: fx.game_id + 1,
        })
        .await;

    assert_eq!(
        errors(&white.drain()),
        vec![format!("Error: not joined to game {}", fx.game_id + 1).as_str()]
    );
    assert!(fx.handler.registry().contains(fx.game_id, white.session.id()));
}

#[tokio::test]
async fn test_close_unregisters_and_ignores_further_commands() {
    let fx = fixture();
    let (mut white, mut black, _observer) = fx.seated_game().await;

    white.session.close().await;
    assert_eq!(white.session.state(), &ConnectionState::Closed);
    assert!(!fx.handler.registry().contains(fx.game_id, white.session.id()));

    white.play(fx.game_id, "e2", "e4").await;
    assert!(white.drain().is_empty());
    assert!(black.drain().is_empty());

    // Closing keeps the seat for a reconnect
    let session = fx.store.get_game(fx.game_id).await.unwrap();
    assert_eq!(session.white_username.as_deref(), Some("alice"));
}

#[tokio::test]
async fn test_pruned_connection_must_join_again() {
    let fx = fixture();
    // Room for the LOAD_GAME reply only
    let mut white = fx.client_with_capacity(&fx.alice, 1);
    white.join(fx.game_id, Some(JoinRole::White)).await;

    let mut black = fx.client(&fx.bob);
    black.join(fx.game_id, Some(JoinRole::Black)).await;
    assert!(!fx.handler.registry().contains(fx.game_id, white.session.id()));
    assert_eq!(load_games(&white.drain()).len(), 1);

    white.play(fx.game_id, "e2", "e4").await;
    assert_eq!(errors(&white.drain()), vec!["Error: join a game first"]);
    assert_eq!(white.session.state(), &ConnectionState::Unjoined);
    assert_eq!(fx.game().await, Game::new());

    white.join(fx.game_id, Some(JoinRole::White)).await;
    assert_eq!(load_games(&white.drain()).len(), 1);
    assert!(matches!(
        white.session.state(),
        ConnectionState::Joined { role: JoinRole::White, .. }
    ));
    assert!(fx.handler.registry().contains(fx.game_id, white.session.id()));
}
