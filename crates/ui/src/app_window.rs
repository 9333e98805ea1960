//! Application window management
//!
//! Terminal front end: reads commands line by line, redraws the clock panel
//! whenever the store or the error slot changes, and runs records requests
//! in the background.

use std::io;
use std::sync::Arc;

use tickwatch_application::{
    AddGradeInput, AddStudentInput, ErrorSurface, FetchBaseline, PushChannel, RecordsGateway,
    StatusSource, StudentRecords, SubscriptionManager, TimeStore, ViewTranscriptInput,
};
use tickwatch_domain::ClockConfig;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::bridge::{UiCommand, UiUpdate};
use crate::view::{ClockPanel, HELP_TEXT};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// The clock application bound to its adapters.
pub struct AppWindow<S, G, C>
where
    S: StatusSource + 'static,
    G: RecordsGateway + 'static,
    C: PushChannel,
{
    store: TimeStore,
    errors: ErrorSurface,
    subscription: SubscriptionManager<C>,
    baseline: Arc<FetchBaseline<S>>,
    records: Arc<StudentRecords<G>>,
    start_watching: bool,
    clear_screen: bool,
}

/// Output state kept between redraws.
struct Screen<W> {
    out: W,
    clear: bool,
    notice: Vec<String>,
    show_help: bool,
}

impl<W: AsyncWrite + Unpin> Screen<W> {
    async fn draw(&mut self, panel: &ClockPanel) -> io::Result<()> {
        let mut text = String::new();
        if self.clear {
            text.push_str(CLEAR_SCREEN);
        }
        text.push_str(&panel.render_text());
        for line in &self.notice {
            text.push_str(line);
            text.push('\n');
        }
        if self.show_help {
            text.push_str(HELP_TEXT);
            text.push('\n');
        }
        text.push_str("> ");
        self.out.write_all(text.as_bytes()).await?;
        self.out.flush().await
    }
}

impl<S, G, C> AppWindow<S, G, C>
where
    S: StatusSource + 'static,
    G: RecordsGateway + 'static,
    C: PushChannel,
{
    /// Wires the use cases to the given adapters.
    pub fn new(config: &ClockConfig, status: Arc<S>, gateway: Arc<G>, channel: Arc<C>) -> Self {
        let store = TimeStore::new();
        let subscription =
            SubscriptionManager::new(channel, store.writer()).with_reconnect(config.reconnect);

        Self {
            errors: ErrorSurface::new(),
            subscription,
            baseline: Arc::new(FetchBaseline::new(status).with_timeout(config.baseline_timeout())),
            records: Arc::new(StudentRecords::new(gateway)),
            start_watching: config.start_watching,
            store,
            clear_screen: true,
        }
    }

    /// Disables the ANSI clear before each redraw.
    #[must_use]
    pub const fn without_clear_screen(mut self) -> Self {
        self.clear_screen = false;
        self
    }

    /// The canonical time store shown by this window.
    #[must_use]
    pub const fn store(&self) -> &TimeStore {
        &self.store
    }

    /// The error slot shown by this window.
    #[must_use]
    pub const fn errors(&self) -> &ErrorSurface {
        &self.errors
    }

    /// Runs on the process's stdin and stdout until `q`, end of input or
    /// Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub async fn run(self) -> io::Result<()> {
        self.run_with(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Runs the loop over arbitrary input and output streams.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `output` fails.
    pub async fn run_with<R, W>(mut self, input: R, output: W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin,
    {
        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<UiCommand>();
        let (update_tx, mut update_rx) = mpsc::unbounded_channel::<UiUpdate>();

        let reader_task = tokio::spawn(read_commands(input, cmd_tx, update_tx.clone()));

        let baseline_task = {
            let writer = self.store.writer();
            let errors = self.errors.clone();
            let baseline = Arc::clone(&self.baseline);
            tokio::spawn(async move { baseline.bootstrap(&writer, &errors).await })
        };

        if self.start_watching {
            self.subscription.set_watching(true).await;
        }

        let mut screen = Screen {
            out: output,
            clear: self.clear_screen,
            notice: Vec::new(),
            show_help: false,
        };
        let mut time_rx = self.store.reader();
        let mut error_rx = self.errors.subscribe();
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        let result = loop {
            let panel = ClockPanel::build(&time_rx.snapshot(), error_rx.borrow_and_update().as_deref());
            if let Err(e) = screen.draw(&panel).await {
                break Err(e);
            }

            tokio::select! {
                biased;
                _ = &mut ctrl_c => {
                    info!("interrupted");
                    break Ok(());
                }
                Some(command) = cmd_rx.recv() => {
                    if command == UiCommand::Quit {
                        break Ok(());
                    }
                    screen.show_help = command == UiCommand::Help;
                    self.handle_command(command, &update_tx).await;
                }
                Some(update) = update_rx.recv() => {
                    screen.notice = match update {
                        UiUpdate::Notice(lines) => lines,
                        UiUpdate::Failure(message) => vec![format!("error: {message}")],
                    };
                }
                Ok(()) = time_rx.changed() => {}
                Ok(()) = error_rx.changed() => {}
            }
        };

        reader_task.abort();
        baseline_task.abort();
        self.subscription.shutdown().await;
        debug!("window loop finished");
        result
    }

    async fn handle_command(&mut self, command: UiCommand, updates: &mpsc::UnboundedSender<UiUpdate>) {
        match command {
            UiCommand::ToggleWatching => {
                let state = self.subscription.toggle().await;
                info!(state = state.as_str(), "watching toggled");
            }
            UiCommand::CreateError => self.errors.raise_sample(),
            UiCommand::ClearErrors => self.errors.clear(),
            UiCommand::AddStudent {
                password,
                student_name,
            } => {
                let records = Arc::clone(&self.records);
                spawn_request(updates.clone(), async move {
                    records
                        .add_student(AddStudentInput {
                            password,
                            student_name,
                        })
                        .await
                        .map(|output| vec![output.to_string()])
                });
            }
            UiCommand::AddGrade {
                password,
                student_id,
                course_grade,
                course_name,
            } => {
                let records = Arc::clone(&self.records);
                spawn_request(updates.clone(), async move {
                    records
                        .add_grade(AddGradeInput {
                            password,
                            student_id,
                            course_name,
                            course_grade,
                        })
                        .await
                        .map(|output| vec![output.to_string()])
                });
            }
            UiCommand::ViewTranscript {
                password,
                student_id,
            } => {
                let records = Arc::clone(&self.records);
                spawn_request(updates.clone(), async move {
                    records
                        .view_transcript(ViewTranscriptInput {
                            password,
                            student_id,
                        })
                        .await
                        .map(|lookup| lookup.lines())
                });
            }
            UiCommand::Help | UiCommand::Quit => {}
        }
    }
}

/// Runs a records request in the background and reports its outcome.
fn spawn_request<F, E>(updates: mpsc::UnboundedSender<UiUpdate>, request: F)
where
    F: Future<Output = Result<Vec<String>, E>> + Send + 'static,
    E: std::fmt::Display,
{
    tokio::spawn(async move {
        let update = match request.await {
            Ok(lines) => UiUpdate::Notice(lines),
            Err(e) => UiUpdate::Failure(e.to_string()),
        };
        let _ = updates.send(update);
    });
}

/// Forwards parsed input lines until end of input, then asks to quit.
async fn read_commands<R>(
    input: R,
    commands: mpsc::UnboundedSender<UiCommand>,
    updates: mpsc::UnboundedSender<UiUpdate>,
) where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match UiCommand::parse(&line) {
                Ok(Some(command)) => {
                    if commands.send(command).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    let _ = updates.send(UiUpdate::Failure(e.to_string()));
                }
            },
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "failed to read input");
                break;
            }
        }
    }
    let _ = commands.send(UiCommand::Quit);
}
