use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{DateTime, Local};
use eframe::egui::{
    self, Align, Color32, Key, Layout, RichText, ScrollArea, TextEdit, TopBottomPanel, Ui,
};

use crate::alarm::board::AlarmBoard;
use crate::alarm::model::{Alarm, AlarmStatus, AppState, DELETION_GRACE_MS};
use crate::alarm::parser::{
    self, AlarmRequest, Command, HELP_TEXT, MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE, MS_PER_SECOND,
    USAGE_HINT,
};
use crate::history::CommandHistory;
use crate::sinks::AlertSinks;
use crate::store::Store;

const TICK_INTERVAL: Duration = Duration::from_secs(1);
const QUICK_FARM_MS: i64 = 10 * MS_PER_MINUTE;
const QUICK_TRADE_MS: i64 = 15 * MS_PER_MINUTE;

pub fn run_gui(
    store: Store,
    board: AlarmBoard,
    history: CommandHistory,
    sinks: Box<dyn AlertSinks>,
) -> Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Zeno")
            .with_inner_size([900.0, 640.0])
            .with_min_inner_size([680.0, 480.0]),
        ..Default::default()
    };

    let app = ZenoApp::new(store, board, history, sinks);

    eframe::run_native(
        "Zeno",
        native_options,
        Box::new(move |cc| {
            configure_theme(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
    .map_err(|err| anyhow::anyhow!("failed to launch Zeno GUI: {err}"))?;

    Ok(())
}

fn configure_theme(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::dark();
    visuals.override_text_color = Some(Color32::from_rgb(226, 234, 246));
    visuals.panel_fill = Color32::from_rgb(10, 14, 24);
    visuals.window_fill = Color32::from_rgb(14, 18, 30);
    visuals.widgets.noninteractive.bg_fill = Color32::from_rgb(12, 16, 28);
    visuals.widgets.inactive.bg_fill = Color32::from_rgb(18, 24, 38);
    visuals.widgets.hovered.bg_fill = Color32::from_rgb(28, 40, 62);
    visuals.widgets.active.bg_fill = Color32::from_rgb(38, 58, 88);
    visuals.selection.bg_fill = Color32::from_rgb(43, 120, 178);
    ctx.set_visuals(visuals);
}

struct ZenoApp {
    store: Store,
    board: AlarmBoard,
    history: CommandHistory,
    sinks: Box<dyn AlertSinks>,
    input: String,
    status_message: Option<(String, Instant)>,
    show_help: bool,
    focus_input: bool,
    latest_now: DateTime<Local>,
    next_tick: Instant,
}

impl ZenoApp {
    fn new(
        store: Store,
        board: AlarmBoard,
        history: CommandHistory,
        sinks: Box<dyn AlertSinks>,
    ) -> Self {
        Self {
            store,
            board,
            history,
            sinks,
            input: String::new(),
            status_message: None,
            show_help: false,
            focus_input: true,
            latest_now: Local::now(),
            next_tick: Instant::now() + TICK_INTERVAL,
        }
    }

    fn set_status(&mut self, text: impl Into<String>, ttl: Duration) {
        self.status_message = Some((text.into(), Instant::now() + ttl));
    }

    fn persist(&self) {
        self.store.save(&AppState {
            alarms: self.board.export(),
            command_history: self.history.entries().to_vec(),
        });
    }

    /// One-second expiry pass. Skipped frames collapse into a single tick
    /// since firing and retention only depend on the wall clock.
    fn tick(&mut self) {
        self.latest_now = Local::now();
        if Instant::now() < self.next_tick {
            return;
        }
        let outcome = self.board.tick(self.latest_now, self.sinks.as_ref());
        if outcome.changed_anything() {
            self.persist();
        }
        let now = Instant::now();
        while self.next_tick <= now {
            self.next_tick += TICK_INTERVAL;
        }
    }

    /// Handles one submitted input line. Every non-empty submission lands in
    /// the history; the input box is cleared only when the command succeeded,
    /// so a typo stays editable.
    fn submit_input(&mut self) {
        let raw = self.input.trim().to_string();
        if raw.is_empty() {
            return;
        }
        self.history.push(&raw);

        let now = Local::now();
        let accepted = match parser::parse_command(&raw, now) {
            Ok(Command::Clear) => {
                let removed = self.board.clear();
                self.set_status(format!("Cleared {removed} alarm(s)."), Duration::from_secs(3));
                true
            }
            Ok(Command::Help) => {
                self.show_help = true;
                true
            }
            Ok(Command::QuickFarm) => {
                self.board
                    .create(AlarmRequest::countdown("farm", QUICK_FARM_MS, now), now);
                self.set_status("Added farm alarm (10m).", Duration::from_secs(3));
                true
            }
            Ok(Command::QuickTrade) => {
                self.board
                    .create(AlarmRequest::countdown("trade", QUICK_TRADE_MS, now), now);
                self.set_status("Added trade alarm (15m).", Duration::from_secs(3));
                true
            }
            Ok(Command::New(request)) => {
                let text = if request.message.is_empty() {
                    format!("Added alarm for {}.", format_time_remaining(request.duration_ms))
                } else {
                    format!(
                        "Added '{}' in {}.",
                        request.message,
                        format_time_remaining(request.duration_ms)
                    )
                };
                self.board.create(request, now);
                self.set_status(text, Duration::from_secs(3));
                true
            }
            Err(_) => {
                self.set_status(USAGE_HINT, Duration::from_secs(6));
                false
            }
        };

        self.persist();
        if accepted {
            self.input.clear();
        }
        self.focus_input = true;
    }

    fn show_header(&mut self, ui: &mut Ui) {
        ui.horizontal_wrapped(|ui| {
            ui.label(
                RichText::new("Zeno")
                    .size(24.0)
                    .color(Color32::from_rgb(96, 228, 206))
                    .strong(),
            );
            ui.separator();
            ui.label(
                RichText::new(self.latest_now.format("%H:%M:%S").to_string())
                    .size(24.0)
                    .color(Color32::from_rgb(255, 214, 117))
                    .strong(),
            );
            ui.separator();
            ui.label(
                RichText::new(self.latest_now.format("%A, %B %d %Y").to_string())
                    .size(16.0)
                    .color(Color32::from_rgb(169, 188, 209)),
            );
            ui.separator();
            ui.label(
                RichText::new(format!("{} alarm(s)", self.board.len()))
                    .color(Color32::from_rgb(114, 220, 205)),
            );
        });

        if let Some((msg, _)) = &self.status_message {
            ui.label(
                RichText::new(msg)
                    .color(Color32::from_rgb(255, 183, 95))
                    .strong(),
            );
        }
    }

    fn show_history_panel(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading(
                RichText::new("Command History")
                    .color(Color32::from_rgb(104, 221, 205))
                    .strong(),
            );
        });
        if ui.button("Clear History").clicked() {
            self.history.clear();
            self.persist();
        }
        ui.add_space(4.0);

        if self.history.is_empty() {
            ui.label(
                RichText::new("No commands yet.").color(Color32::from_rgb(146, 160, 177)),
            );
            return;
        }

        let entries: Vec<String> = self.history.entries().to_vec();
        ScrollArea::vertical()
            .id_salt("history_scroll")
            .show(ui, |ui| {
                for (index, entry) in entries.iter().enumerate() {
                    let selected = self.history.cursor() == Some(index);
                    if ui.selectable_label(selected, entry.as_str()).clicked() {
                        self.history.select(index);
                        self.input = entry.clone();
                        self.focus_input = true;
                    }
                }
            });
    }

    fn show_alarm_list(&mut self, ui: &mut Ui) {
        ui.heading(
            RichText::new("Alarms")
                .color(Color32::from_rgb(104, 221, 205))
                .strong(),
        );
        ui.add_space(4.0);

        if self.board.is_empty() {
            ui.label(
                RichText::new("No alarms. Try 'farm in 10m' or 'help'.")
                    .color(Color32::from_rgb(255, 190, 106)),
            );
            return;
        }

        let mut toggle_id: Option<String> = None;
        let mut remove_id: Option<String> = None;

        let now = self.latest_now;
        ScrollArea::vertical()
            .id_salt("alarms_scroll")
            .show(ui, |ui| {
                egui::Grid::new("alarms_grid")
                    .striped(true)
                    .num_columns(5)
                    .show(ui, |ui| {
                        ui.label(RichText::new("Message").strong());
                        ui.label(RichText::new("Fires At").strong());
                        ui.label(RichText::new("Remaining").strong());
                        ui.label(RichText::new("Pause").strong());
                        ui.label(RichText::new("Remove").strong());
                        ui.end_row();

                        for alarm in self.board.alarms() {
                            let message = if alarm.message.is_empty() {
                                "(no message)"
                            } else {
                                alarm.message.as_str()
                            };
                            ui.label(message);
                            ui.label(
                                RichText::new(alarm.time.format("%H:%M:%S").to_string())
                                    .monospace(),
                            );
                            let color = match alarm.status() {
                                AlarmStatus::Counting => Color32::from_rgb(108, 228, 138),
                                AlarmStatus::PendingDeletion => Color32::from_rgb(255, 124, 124),
                                AlarmStatus::Kept => Color32::from_rgb(255, 214, 117),
                            };
                            ui.colored_label(color, time_display(alarm, now));
                            let toggle_label = if alarm.is_active { "Pause" } else { "Resume" };
                            if ui.button(toggle_label).clicked() {
                                toggle_id = Some(alarm.id.clone());
                            }
                            if ui
                                .add(
                                    egui::Button::new(
                                        RichText::new("Delete")
                                            .color(Color32::from_rgb(255, 124, 124))
                                            .strong(),
                                    )
                                    .fill(Color32::from_rgb(51, 20, 24)),
                                )
                                .clicked()
                            {
                                remove_id = Some(alarm.id.clone());
                            }
                            ui.end_row();
                        }
                    });
            });

        if let Some(id) = toggle_id
            && self.board.toggle(&id, now)
        {
            self.persist();
        }
        if let Some(id) = remove_id
            && let Some(removed) = self.board.remove(&id)
        {
            self.persist();
            let name = if removed.message.is_empty() {
                "alarm".to_string()
            } else {
                format!("'{}'", removed.message)
            };
            self.set_status(format!("Removed {name}."), Duration::from_secs(3));
        }
    }

    fn show_input_panel(&mut self, ui: &mut Ui) {
        ui.add_space(4.0);
        let response = ui.add(
            TextEdit::singleline(&mut self.input)
                .hint_text("farm in 10m [keep]   (help for commands)")
                .desired_width(f32::INFINITY),
        );

        if response.has_focus() {
            if ui.input_mut(|i| i.consume_key(egui::Modifiers::NONE, Key::ArrowUp))
                && let Some(entry) = self.history.older()
            {
                self.input = entry.to_string();
            }
            if ui.input_mut(|i| i.consume_key(egui::Modifiers::NONE, Key::ArrowDown)) {
                self.input = self.history.newer().unwrap_or("").to_string();
            }
        }

        if response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
            self.submit_input();
        }
        if self.focus_input {
            response.request_focus();
            self.focus_input = false;
        }
        ui.add_space(4.0);
    }

    fn show_help_window(&mut self, ctx: &egui::Context) {
        if !self.show_help {
            return;
        }
        let mut open = true;
        egui::Window::new("Help")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                ui.monospace(HELP_TEXT);
            });
        self.show_help = open;
    }
}

impl eframe::App for ZenoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some((_, expires_at)) = &self.status_message
            && Instant::now() >= *expires_at
        {
            self.status_message = None;
        }

        self.tick();

        TopBottomPanel::top("header")
            .resizable(false)
            .show(ctx, |ui| self.show_header(ui));

        TopBottomPanel::bottom("input_panel")
            .resizable(false)
            .show(ctx, |ui| self.show_input_panel(ui));

        egui::SidePanel::left("history_panel")
            .resizable(true)
            .min_width(180.0)
            .default_width(220.0)
            .show(ctx, |ui| self.show_history_panel(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.with_layout(Layout::top_down(Align::Min), |ui| self.show_alarm_list(ui));
        });

        self.show_help_window(ctx);

        let wait = self.next_tick.saturating_duration_since(Instant::now());
        ctx.request_repaint_after(wait);
    }
}

/// Formats a millisecond span as space-joined d/h/m/s parts, zero components
/// omitted. Sub-second spans render as "0s".
fn format_time_remaining(remaining_ms: i64) -> String {
    let ms = remaining_ms.max(0);
    let days = ms / MS_PER_DAY;
    let hours = (ms % MS_PER_DAY) / MS_PER_HOUR;
    let minutes = (ms % MS_PER_HOUR) / MS_PER_MINUTE;
    let seconds = (ms % MS_PER_MINUTE) / MS_PER_SECOND;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if seconds > 0 {
        parts.push(format!("{seconds}s"));
    }
    if parts.is_empty() {
        return "0s".to_string();
    }
    parts.join(" ")
}

/// Row text for one alarm: the live countdown while active, the deletion
/// countdown once fired, or "Keep" for kept alarms.
fn time_display(alarm: &Alarm, now: DateTime<Local>) -> String {
    match alarm.status() {
        AlarmStatus::PendingDeletion => {
            let until_deletion = DELETION_GRACE_MS + alarm.remaining_ms(now);
            if until_deletion <= 0 {
                return "Deleting soon...".to_string();
            }
            format!("Deleting in {}", format_time_remaining(until_deletion))
        }
        AlarmStatus::Kept => "Keep".to_string(),
        AlarmStatus::Counting => format_time_remaining(alarm.remaining_ms(now)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alarm_at(time: DateTime<Local>, is_active: bool, keep: bool) -> Alarm {
        Alarm {
            id: "test-1".to_string(),
            message: "farm".to_string(),
            time,
            is_active,
            duration: Some(600_000),
            elapsed_time: None,
            keep,
        }
    }

    #[test]
    fn remaining_formats_compound_spans() {
        assert_eq!(format_time_remaining(5_400_000), "1h 30m");
        assert_eq!(
            format_time_remaining(MS_PER_DAY + 2 * MS_PER_HOUR + 5 * MS_PER_SECOND),
            "1d 2h 5s"
        );
        assert_eq!(format_time_remaining(45_000), "45s");
    }

    #[test]
    fn remaining_clamps_negative_and_subsecond_spans() {
        assert_eq!(format_time_remaining(-5_000), "0s");
        assert_eq!(format_time_remaining(900), "0s");
    }

    #[test]
    fn counting_alarm_shows_the_countdown() {
        let now = Local::now();
        let alarm = alarm_at(now + chrono::Duration::minutes(10), true, false);
        assert_eq!(time_display(&alarm, now), "10m");
    }

    #[test]
    fn fired_alarm_counts_down_to_deletion() {
        let now = Local::now();
        let alarm = alarm_at(now - chrono::Duration::minutes(2), false, false);
        assert_eq!(time_display(&alarm, now), "Deleting in 3m");
    }

    #[test]
    fn fired_alarm_past_the_window_says_deleting_soon() {
        let now = Local::now();
        let alarm = alarm_at(now - chrono::Duration::minutes(6), false, false);
        assert_eq!(time_display(&alarm, now), "Deleting soon...");
    }

    #[test]
    fn kept_alarm_shows_keep() {
        let now = Local::now();
        let alarm = alarm_at(now - chrono::Duration::hours(3), false, true);
        assert_eq!(time_display(&alarm, now), "Keep");
    }
}
