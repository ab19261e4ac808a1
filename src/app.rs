//! English Buddy chat window, an egui/eframe application.
//!
//! [`ChatApp`] owns the [`SessionController`] and drives it from the UI
//! thread.  Slow work (WAV encoding, gateway exchanges, transcriptions) runs
//! on the tokio runtime; outcomes come back as [`WorkerEvent`]s over an mpsc
//! channel and are applied to the session on the next frame.  A task that
//! panics still produces an event, so the session never stays busy.
//!
//! # Layout
//!
//! | Area   | Content |
//! |--------|---------|
//! | top    | title, subtitle, "Clear Chat" |
//! | centre | message history, or an empty-state hint |
//! | bottom | status / error line, text input, Send, Record |

use std::time::Duration;

use eframe::egui;
use tokio::sync::mpsc;

use crate::audio::{CaptureError, Recorder};
use crate::config::AppConfig;
use crate::gateway::GatewayError;
use crate::session::{Role, SessionController, SessionError, SessionStatus, Turn};
use crate::stt::TranscriptionError;

// ---------------------------------------------------------------------------
// WorkerEvent
// ---------------------------------------------------------------------------

/// Outcome of a background task, delivered to the UI thread.
#[derive(Debug)]
pub enum WorkerEvent {
    /// The stopped recording, encoded as WAV.
    Recorded(Result<Vec<u8>, CaptureError>),
    Reply(Result<String, GatewayError>),
    Transcript(Result<String, TranscriptionError>),
}

/// What the user asked for this frame.
enum UiAction {
    Send,
    ToggleRecording,
    Clear,
}

// ---------------------------------------------------------------------------
// ChatApp
// ---------------------------------------------------------------------------

pub struct ChatApp {
    controller: SessionController,
    runtime: tokio::runtime::Handle,
    event_tx: mpsc::Sender<WorkerEvent>,
    event_rx: mpsc::Receiver<WorkerEvent>,

    recorder: Option<Recorder>,
    /// A stopped recording is being encoded off the UI thread.
    encoding: bool,
    max_recording_secs: f32,

    /// Inline error shown above the input (transcription and rejected actions).
    error_message: Option<String>,
    gateway_url: String,
}

impl ChatApp {
    pub fn new(
        controller: SessionController,
        runtime: tokio::runtime::Handle,
        config: &AppConfig,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(16);
        Self {
            controller,
            runtime,
            event_tx,
            event_rx,
            recorder: None,
            encoding: false,
            max_recording_secs: config.audio.max_recording_secs,
            error_message: None,
            gateway_url: config.gateway.url.clone(),
        }
    }

    fn is_busy(&self) -> bool {
        self.encoding || self.controller.status().is_busy()
    }

    /// Await `task` on the runtime and deliver its outcome as an event.
    /// A panicked or cancelled task is reported through `on_abort`.
    fn forward<T: Send + 'static>(
        &self,
        ctx: &egui::Context,
        task: tokio::task::JoinHandle<T>,
        on_abort: fn(tokio::task::JoinError) -> T,
        into_event: fn(T) -> WorkerEvent,
    ) {
        let tx = self.event_tx.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let outcome = task.await.unwrap_or_else(|e| {
                log::error!("background task aborted: {e}");
                on_abort(e)
            });
            let _ = tx.send(into_event(outcome)).await;
            ctx.request_repaint();
        });
    }

    // ── Channel polling ──────────────────────────────────────────────────

    /// Apply every finished background task (non-blocking).
    fn poll_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.apply_event(event, ctx);
        }
    }

    fn apply_event(&mut self, event: WorkerEvent, ctx: &egui::Context) {
        match event {
            WorkerEvent::Recorded(outcome) => {
                self.encoding = false;
                match outcome {
                    Ok(wav) => self.start_transcription(wav, ctx),
                    Err(e) => self.error_message = Some(format!("Microphone error: {e}")),
                }
            }
            WorkerEvent::Reply(outcome) => {
                if let Err(e) = self.controller.complete_exchange(outcome) {
                    log::error!("stray reply: {e}");
                }
            }
            WorkerEvent::Transcript(outcome) => {
                match self.controller.complete_transcription(outcome) {
                    Ok(text) => {
                        log::info!("transcribed {} chars", text.len());
                        self.error_message = None;
                    }
                    Err(e) => self.error_message = Some(e.to_string()),
                }
            }
        }
    }

    // ── Actions ──────────────────────────────────────────────────────────

    fn send(&mut self, ctx: &egui::Context) {
        match self.controller.begin_submit_pending() {
            Ok(ticket) => {
                self.error_message = None;
                let task = self.runtime.spawn(ticket.run());
                self.forward(
                    ctx,
                    task,
                    |e| Err(GatewayError::Unreachable(format!("request aborted: {e}"))),
                    WorkerEvent::Reply,
                );
            }
            Err(e) => self.error_message = Some(e.to_string()),
        }
    }

    fn toggle_recording(&mut self, ctx: &egui::Context) {
        match self.recorder.take() {
            Some(recorder) => self.finish_recording(recorder, ctx),
            None => {
                if self.is_busy() {
                    return;
                }
                match Recorder::start(self.max_recording_secs) {
                    Ok(recorder) => {
                        self.error_message = None;
                        self.recorder = Some(recorder);
                    }
                    Err(e) => self.error_message = Some(format!("Microphone error: {e}")),
                }
            }
        }
    }

    fn finish_recording(&mut self, recorder: Recorder, ctx: &egui::Context) {
        let stopped = recorder.stop();
        self.encoding = true;
        let task = self.runtime.spawn_blocking(move || stopped.into_wav());
        self.forward(ctx, task, |_| Err(CaptureError::Worker), WorkerEvent::Recorded);
    }

    fn start_transcription(&mut self, wav: Vec<u8>, ctx: &egui::Context) {
        match self.controller.begin_transcription(wav) {
            Ok(Some(ticket)) => {
                let task = self.runtime.spawn(ticket.run());
                self.forward(
                    ctx,
                    task,
                    |e| {
                        Err(TranscriptionError::ProviderError(format!(
                            "transcription aborted: {e}"
                        )))
                    },
                    WorkerEvent::Transcript,
                );
            }
            Ok(None) => {
                self.error_message =
                    Some("That recording was already transcribed. Please record again.".into());
            }
            Err(e) => self.error_message = Some(e.to_string()),
        }
    }

    fn clear(&mut self) {
        match self.controller.clear() {
            Ok(()) => self.error_message = None,
            Err(e @ SessionError::InvalidState { .. }) => self.error_message = Some(e.to_string()),
            Err(e) => log::warn!("clear failed: {e}"),
        }
    }

    // ── Panels ───────────────────────────────────────────────────────────

    fn draw_header(&self, ui: &mut egui::Ui) -> Option<UiAction> {
        let mut action = None;
        ui.add_space(6.0);
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.label(
                    egui::RichText::new("English Buddy")
                        .strong()
                        .size(22.0)
                        .color(egui::Color32::from_rgb(90, 140, 250)),
                );
                ui.label(
                    egui::RichText::new("Practise your English with a friendly tutor")
                        .size(12.0)
                        .color(egui::Color32::from_rgb(150, 150, 150)),
                );
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let clear = ui.add_enabled(
                    !self.is_busy() && self.recorder.is_none(),
                    egui::Button::new("Clear Chat"),
                );
                if clear.clicked() {
                    action = Some(UiAction::Clear);
                }
            });
        });
        ui.add_space(4.0);
        action
    }

    fn draw_history(&self, ui: &mut egui::Ui) {
        let turns = self.controller.turns();
        if turns.is_empty() {
            draw_empty_state(ui);
            return;
        }

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for turn in turns {
                    draw_turn(ui, turn);
                    ui.add_space(6.0);
                }
                if self.controller.status() == SessionStatus::AwaitingReply {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(
                            egui::RichText::new("Thinking...")
                                .italics()
                                .color(egui::Color32::from_rgb(150, 150, 150)),
                        );
                    });
                }
            });
    }

    fn draw_composer(&mut self, ui: &mut egui::Ui) -> Option<UiAction> {
        let mut action = None;
        let busy = self.is_busy();
        let recording = self.recorder.is_some();

        ui.add_space(4.0);
        if let Some(msg) = &self.error_message {
            ui.label(
                egui::RichText::new(msg.as_str())
                    .size(12.0)
                    .color(egui::Color32::from_rgb(255, 136, 68)),
            );
        } else if let Some(recorder) = &self.recorder {
            ui.label(
                egui::RichText::new(format!(
                    "Recording... {:.1}s (max {:.0}s)",
                    recorder.elapsed().as_secs_f32(),
                    self.max_recording_secs
                ))
                .size(12.0)
                .color(egui::Color32::from_rgb(255, 80, 80)),
            );
        } else if self.encoding {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(egui::RichText::new("Processing recording...").size(12.0));
            });
        } else if busy {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(egui::RichText::new(self.controller.status().label()).size(12.0));
            });
        }

        ui.horizontal(|ui| {
            let record_label = if recording { "Stop" } else { "Record" };
            let record = ui.add_enabled(!busy, egui::Button::new(record_label));
            if record.clicked() {
                action = Some(UiAction::ToggleRecording);
            }

            let send_width = 64.0;
            let input_width = (ui.available_width() - send_width - 8.0).max(80.0);
            let input = ui.add_enabled(
                !busy && !recording,
                egui::TextEdit::singleline(self.controller.pending_input_mut())
                    .hint_text("Type your message here...")
                    .desired_width(input_width),
            );
            let submitted = input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            let send = ui.add_enabled(
                !busy && !recording,
                egui::Button::new("Send").min_size(egui::vec2(send_width, 0.0)),
            );
            if send.clicked() || submitted {
                action = Some(UiAction::Send);
            }
        });

        ui.label(
            egui::RichText::new(format!("Tutor service: {}", self.gateway_url))
                .size(10.0)
                .color(egui::Color32::from_rgb(110, 110, 110)),
        );
        ui.add_space(4.0);
        action
    }
}

// ── Free-standing renderers ──────────────────────────────────────────────

fn draw_empty_state(ui: &mut egui::Ui) {
    ui.centered_and_justified(|ui| {
        ui.label(
            egui::RichText::new(
                "Say hello to start practising!\nType a message or press Record to speak.",
            )
            .size(14.0)
            .color(egui::Color32::from_rgb(130, 130, 130)),
        );
    });
}

fn draw_turn(ui: &mut egui::Ui, turn: &Turn) {
    let (fill, accent) = match turn.role() {
        Role::User => (
            egui::Color32::from_rgb(40, 48, 66),
            egui::Color32::from_rgb(120, 170, 255),
        ),
        Role::Assistant => (
            egui::Color32::from_rgb(36, 54, 44),
            egui::Color32::from_rgb(110, 200, 140),
        ),
    };

    egui::Frame::new()
        .fill(fill)
        .corner_radius(egui::CornerRadius::same(8))
        .inner_margin(egui::Margin::same(8))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(format!(
                        "{} {}",
                        turn.role().icon(),
                        turn.role().display_name()
                    ))
                    .strong()
                    .color(accent),
                );
                ui.label(
                    egui::RichText::new(turn.time_label())
                        .size(10.0)
                        .color(egui::Color32::from_rgb(140, 140, 140)),
                );
            });
            ui.label(turn.content());
        });
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_events(ctx);

        if let Some(recorder) = &self.recorder {
            if recorder.elapsed().as_secs_f32() >= self.max_recording_secs {
                log::info!("recording limit reached, stopping");
                if let Some(recorder) = self.recorder.take() {
                    self.finish_recording(recorder, ctx);
                }
            }
        }

        if self.recorder.is_some() || self.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        let mut actions = Vec::new();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            actions.extend(self.draw_header(ui));
        });

        egui::TopBottomPanel::bottom("composer").show(ctx, |ui| {
            actions.extend(self.draw_composer(ui));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_history(ui);
        });

        for action in actions {
            match action {
                UiAction::Send => self.send(ctx),
                UiAction::ToggleRecording => self.toggle_recording(ctx),
                UiAction::Clear => self.clear(),
            }
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.recorder.take();
        log::info!("English Buddy closing");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
