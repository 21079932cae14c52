//! Interactive view state and key handling.

use std::sync::Arc;

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pvw_core::{
    CaptureSource, Column, Derivation, DirectoryLookup, Process, ProcessTerminator, Session,
};
use ratatui::widgets::TableState;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Work dispatched to a background task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Refresh,
    Terminate { pid: u32 },
}

/// Result of a background request, tagged with the generation it was
/// dispatched under.
#[derive(Debug)]
pub struct Message {
    pub generation: u64,
    pub request: Request,
    pub result: pvw_core::Result<Derivation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub is_error: bool,
}

pub struct App<C, T, D> {
    session: Arc<Session<C, T, D>>,
    sender: UnboundedSender<Message>,
    /// Generation of the most recent dispatch. Older results are stale.
    generation: u64,

    pub derivation: Derivation,
    pub columns: Vec<Column>,
    pub table_state: TableState,
    pub search: String,
    pub searching: bool,
    pub show_help: bool,
    pub read_only: bool,
    pub loading: bool,
    pub last_capture: Option<DateTime<Local>>,
    status: Option<Status>,
    should_quit: bool,
}

impl<C, T, D> App<C, T, D> {
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// The process owning the selected row.
    pub fn selected_process(&self) -> Option<&Process> {
        self.table_state
            .selected()
            .and_then(|row| self.derivation.process_for_row(row))
    }
}

impl<C, T, D> App<C, T, D>
where
    C: CaptureSource + 'static,
    T: ProcessTerminator + 'static,
    D: DirectoryLookup + 'static,
{
    pub fn new(session: Arc<Session<C, T, D>>, read_only: bool, sender: UnboundedSender<Message>) -> Self {
        let settings = session.settings();
        Self {
            session,
            sender,
            generation: 0,
            derivation: Derivation::default(),
            columns: settings.columns,
            table_state: TableState::default(),
            search: settings.search_term,
            searching: false,
            show_help: false,
            read_only,
            loading: false,
            last_capture: None,
            status: None,
            should_quit: false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.searching {
            self.handle_search_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Char('t') => self.terminate_selected(),
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Char('?') => self.show_help = !self.show_help,
            KeyCode::Esc => {
                self.show_help = false;
                self.status = None;
            }
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('/') => self.searching = false,
            KeyCode::Backspace => {
                if self.search.pop().is_some() {
                    self.search_changed();
                }
            }
            KeyCode::Char(c) => {
                self.search.push(c);
                self.search_changed();
            }
            _ => {}
        }
    }

    /// Capture again in the background.
    pub fn refresh(&mut self) {
        self.dispatch(Request::Refresh);
    }

    fn terminate_selected(&mut self) {
        if self.read_only {
            self.set_status("Read-only mode, termination is disabled", false);
            return;
        }

        let Some(process) = self.selected_process() else {
            return;
        };
        let (pid, name) = (process.id, process.name.clone());

        self.set_status(format!("Terminating {} (PID {})...", name, pid), false);
        self.dispatch(Request::Terminate { pid });
    }

    fn dispatch(&mut self, request: Request) {
        self.generation += 1;
        self.loading = true;

        let generation = self.generation;
        let session = Arc::clone(&self.session);
        let sender = self.sender.clone();

        tokio::spawn(async move {
            let result = match request {
                Request::Refresh => session.refresh().await,
                Request::Terminate { pid } => session.terminate_and_refresh(pid).await,
            };
            // The receiver is gone once the view has exited
            let _ = sender.send(Message {
                generation,
                request,
                result,
            });
        });
    }

    /// Apply the result of a background request.
    ///
    /// Rows are re-derived from the session's cache rather than taken from the
    /// result, since the search term may have changed while the task ran.
    pub fn handle_message(&mut self, message: Message) {
        if message.generation != self.generation {
            debug!(
                generation = message.generation,
                current = self.generation,
                "Dropping stale result"
            );
            // A failed termination is still reported
            if let (Request::Terminate { .. }, Err(e)) = (message.request, &message.result) {
                self.set_status(e.to_string(), true);
            }
            return;
        }

        self.loading = false;
        match message.result {
            Ok(_) => {
                self.last_capture = Some(Local::now());
                let result = self.session.rederive();
                self.show(result);
                match message.request {
                    Request::Refresh => self.clear_notice(),
                    Request::Terminate { pid } => {
                        self.set_status(format!("Sent SIGTERM to PID {}", pid), false)
                    }
                }
            }
            Err(e) => self.set_status(e.to_string(), true),
        }
    }

    fn search_changed(&mut self) {
        let result = self.session.set_search_term(self.search.clone());
        self.show(result);
    }

    fn show(&mut self, result: pvw_core::Result<Derivation>) {
        match result {
            Ok(derivation) => self.apply(derivation),
            Err(e) => self.set_status(e.to_string(), true),
        }
    }

    fn apply(&mut self, derivation: Derivation) {
        let len = derivation.table.len();
        self.derivation = derivation;

        let selected = match (len, self.table_state.selected()) {
            (0, _) => None,
            (_, Some(row)) => Some(row.min(len - 1)),
            (_, None) => Some(0),
        };
        self.table_state.select(selected);
    }

    fn select_next(&mut self) {
        let len = self.derivation.table.len();
        if len == 0 {
            return;
        }
        let next = self.table_state.selected().map_or(0, |row| (row + 1).min(len - 1));
        self.table_state.select(Some(next));
    }

    fn select_previous(&mut self) {
        if self.derivation.table.is_empty() {
            return;
        }
        let previous = self.table_state.selected().map_or(0, |row| row.saturating_sub(1));
        self.table_state.select(Some(previous));
    }

    /// Clear informational messages. Errors stay until dismissed with esc.
    fn clear_notice(&mut self) {
        if !self.status.as_ref().is_some_and(|status| status.is_error) {
            self.status = None;
        }
    }

    fn set_status(&mut self, text: impl Into<String>, is_error: bool) {
        self.status = Some(Status {
            text: text.into(),
            is_error,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pvw_core::{Error, FilterSettings};
    use std::collections::VecDeque;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    const CAPTURE: &str = "p1234\ncnginx\nLroot\nf6\nPTCP\nn127.0.0.1:80\nTST=LISTEN\nf7\nPTCP\nn127.0.0.1:443->10.0.0.5:51000\nTST=ESTABLISHED\np42\ncnode\nLdev\nf20\nPTCP\nn*:3000\nTST=LISTEN\n";

    /// Replays queued captures, then repeats `CAPTURE`.
    #[derive(Default)]
    struct MockCapture {
        captures: Mutex<VecDeque<pvw_core::Result<String>>>,
    }

    impl CaptureSource for MockCapture {
        async fn capture(&self) -> pvw_core::Result<String> {
            self.captures
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok(CAPTURE.to_string()))
        }
    }

    /// Records terminated PIDs. PID 1 is refused.
    #[derive(Default)]
    struct MockTerminator {
        killed: Arc<Mutex<Vec<u32>>>,
    }

    impl ProcessTerminator for MockTerminator {
        async fn terminate(&self, pid: u32) -> pvw_core::Result<()> {
            if pid == 1 {
                return Err(Error::PermissionDenied("pid 1".to_string()));
            }
            self.killed.lock().push(pid);
            Ok(())
        }
    }

    type Lookup = fn(u32) -> Option<String>;
    type TestApp = App<MockCapture, MockTerminator, Lookup>;

    fn no_directory(_pid: u32) -> Option<String> {
        None
    }

    fn setup(
        captures: Vec<pvw_core::Result<String>>,
        read_only: bool,
    ) -> (TestApp, Arc<Mutex<Vec<u32>>>, UnboundedReceiver<Message>) {
        let capture = MockCapture {
            captures: Mutex::new(captures.into()),
        };
        let terminator = MockTerminator::default();
        let killed = Arc::clone(&terminator.killed);
        let settings = FilterSettings::new().with_columns([Column::Pid, Column::Name, Column::Port]);
        let session = Arc::new(Session::new(
            capture,
            terminator,
            no_directory as Lookup,
            settings,
        ));
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(session, read_only, tx), killed, rx)
    }

    fn press(app: &mut TestApp, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    async fn settle(app: &mut TestApp, rx: &mut UnboundedReceiver<Message>) {
        let message = rx.recv().await.unwrap();
        app.handle_message(message);
    }

    #[tokio::test]
    async fn test_refresh_populates_table() {
        let (mut app, _killed, mut rx) = setup(vec![], false);
        app.refresh();
        assert!(app.loading);
        settle(&mut app, &mut rx).await;

        assert!(!app.loading);
        assert_eq!(app.derivation.table.len(), 3);
        assert_eq!(app.table_state.selected(), Some(0));
        assert!(app.last_capture.is_some());
    }

    #[tokio::test]
    async fn test_navigation_maps_rows_to_processes() {
        let (mut app, _killed, mut rx) = setup(vec![], false);
        app.refresh();
        settle(&mut app, &mut rx).await;

        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.selected_process().map(|p| p.id), Some(1234));
        press(&mut app, KeyCode::Down);
        assert_eq!(app.selected_process().map(|p| p.id), Some(42));
        press(&mut app, KeyCode::Down);
        assert_eq!(app.table_state.selected(), Some(2));

        press(&mut app, KeyCode::Char('k'));
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.table_state.selected(), Some(0));
    }

    #[tokio::test]
    async fn test_search_rederives_synchronously() {
        let (mut app, _killed, mut rx) = setup(vec![], false);
        app.refresh();
        settle(&mut app, &mut rx).await;

        press(&mut app, KeyCode::Char('/'));
        assert!(app.searching);
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Char('o'));
        assert_eq!(app.search, "no");
        assert_eq!(app.derivation.processes.len(), 1);
        assert_eq!(app.derivation.table.rows[0], vec!["42", "node", "3000"]);

        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.derivation.processes.len(), 2);

        press(&mut app, KeyCode::Esc);
        assert!(!app.searching);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_stale_results_are_dropped() {
        let (mut app, _killed, mut rx) = setup(
            vec![Ok("p9\ncold\nLx\nf1\nPTCP\nn*:9\nTST=LISTEN\n".to_string())],
            false,
        );
        app.refresh();
        let first = rx.recv().await.unwrap();
        app.refresh();
        let second = rx.recv().await.unwrap();

        app.handle_message(second);
        assert_eq!(app.derivation.processes.len(), 2);
        app.handle_message(first);
        assert_eq!(app.derivation.processes.len(), 2);
    }

    #[tokio::test]
    async fn test_terminate_selected_process() {
        let (mut app, killed, mut rx) = setup(vec![], false);
        app.refresh();
        settle(&mut app, &mut rx).await;

        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('t'));
        settle(&mut app, &mut rx).await;

        assert_eq!(*killed.lock(), vec![42]);
        assert_eq!(app.status().map(|s| s.is_error), Some(false));
    }

    #[tokio::test]
    async fn test_refused_termination_reports_error() {
        let (mut app, killed, mut rx) = setup(vec![Ok("p1\ncinit\nLroot\nf3\nPTCP\nn*:1\nTST=LISTEN\n".to_string())], false);
        app.refresh();
        settle(&mut app, &mut rx).await;
        let before = app.derivation.clone();

        press(&mut app, KeyCode::Char('t'));
        settle(&mut app, &mut rx).await;

        assert!(killed.lock().is_empty());
        assert_eq!(app.derivation, before);
        assert_eq!(app.status().map(|s| s.is_error), Some(true));
    }

    #[tokio::test]
    async fn test_read_only_ignores_terminate() {
        let (mut app, killed, mut rx) = setup(vec![], true);
        app.refresh();
        settle(&mut app, &mut rx).await;

        press(&mut app, KeyCode::Char('t'));
        assert!(!app.loading);
        assert!(rx.try_recv().is_err());
        assert!(killed.lock().is_empty());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_rows() {
        let (mut app, _killed, mut rx) = setup(
            vec![
                Ok(CAPTURE.to_string()),
                Err(Error::CommandFailed("lsof exited with code 2".to_string())),
            ],
            false,
        );
        app.refresh();
        settle(&mut app, &mut rx).await;
        let before = app.derivation.clone();

        press(&mut app, KeyCode::Char('r'));
        settle(&mut app, &mut rx).await;

        assert_eq!(app.derivation, before);
        assert_eq!(app.status().map(|s| s.is_error), Some(true));
    }

    #[tokio::test]
    async fn test_refresh_result_follows_newer_search() {
        let (mut app, _killed, mut rx) = setup(vec![], false);
        app.refresh();
        settle(&mut app, &mut rx).await;

        app.refresh();
        let pending = rx.recv().await.unwrap();

        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Char('o'));
        assert_eq!(app.derivation.processes.len(), 1);

        app.handle_message(pending);
        assert_eq!(app.search, "no");
        assert_eq!(app.derivation.processes.len(), 1);
        assert_eq!(app.derivation.table.rows, vec![vec!["42", "node", "3000"]]);
    }

    #[tokio::test]
    async fn test_superseded_termination_failure_is_reported() {
        let (mut app, killed, mut rx) = setup(
            vec![Ok("p1\ncinit\nLroot\nf3\nPTCP\nn*:1\nTST=LISTEN\n".to_string())],
            false,
        );
        app.refresh();
        settle(&mut app, &mut rx).await;

        press(&mut app, KeyCode::Char('t'));
        press(&mut app, KeyCode::Char('r'));
        settle(&mut app, &mut rx).await;
        settle(&mut app, &mut rx).await;

        assert!(killed.lock().is_empty());
        assert!(!app.loading);
        assert_eq!(app.status().map(|s| s.is_error), Some(true));

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.status(), None);
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, _killed, _rx) = setup(vec![], false);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());

        let (mut app, _killed, _rx) = setup(vec![], false);
        app.searching = true;
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit());
    }
}
