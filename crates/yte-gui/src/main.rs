use chrono::{DateTime, Local};
use eframe::{App, egui};
use egui::text::LayoutJob;
use egui::{Color32, FontId, TextFormat};
use std::path::Path;
use tracing_subscriber::EnvFilter;
use yte_core::{Config, Row, Session};

struct EditDialog {
    index: usize,
    text: String,
}

#[derive(Default)]
struct State {
    session: Session,
    status: String,
    search: String,
    replace: String,
    case_sensitive: bool,
    selected: Option<usize>,
    scroll_to_selected: bool,
    editing: Option<EditDialog>,
    // Confirmation flags
    confirm_replace_all: bool,
    last_backup_time: Option<DateTime<Local>>,
}

impl State {
    fn select(&mut self, index: Option<usize>) {
        self.selected = index;
        self.scroll_to_selected = index.is_some();
    }
}

struct AppGui {
    state: State,
}

impl AppGui {
    fn new(_cc: &eframe::CreationContext<'_>, config: Config) -> Self {
        Self {
            state: State {
                case_sensitive: config.case_sensitive,
                session: Session::new(config),
                status: "Select a folder to load YAML files.".into(),
                ..Default::default()
            },
        }
    }
    fn pick_folder(&mut self) {
        if let Some(dir) = rfd::FileDialog::new().set_directory(".").pick_folder() {
            self.load_folder(&dir);
        }
    }
    fn load_folder(&mut self, dir: &Path) {
        self.state.editing = None;
        self.state.confirm_replace_all = false;
        self.state.select(None);
        match self.state.session.open(dir) {
            Ok(report) => self.state.status = report.to_string(),
            Err(e) => self.state.status = format!("Load error: {}", e),
        }
    }
    fn reload(&mut self) {
        if let Some(dir) = self.state.session.folder().map(|p| p.to_path_buf()) {
            self.load_folder(&dir);
        }
    }
    fn on_search_changed(&mut self) {
        self.state.session.reset_search();
        self.state.confirm_replace_all = false;
    }
    fn find_next(&mut self) {
        let term = self.state.search.clone();
        match self.state.session.find_next(&term, self.state.case_sensitive) {
            Ok(Some(m)) => {
                let path = self.state.session.items()[m.item].path.clone();
                self.state.status = format!("Found '{}' in '{}' (line {}).", term, path, m.item + 1);
                self.state.select(Some(m.item));
            }
            Ok(None) => {
                self.state.status = format!("'{}' not found.", term);
                self.state.select(None);
            }
            Err(e) => self.state.status = e.to_string(),
        }
    }
    fn replace_current(&mut self) {
        let replacement = self.state.replace.clone();
        let before = self.state.session.current_match();
        match self.state.session.replace_current(&replacement) {
            Ok(next) => {
                let path = before
                    .map(|m| self.state.session.items()[m.item].path.clone())
                    .unwrap_or_default();
                self.state.status = match next {
                    Some(m) => format!("Replaced in '{}'. Next match on line {}.", path, m.item + 1),
                    None => format!("Replaced in '{}'. No further matches.", path),
                };
                self.state.select(next.map(|m| m.item));
            }
            Err(e) => self.state.status = format!("Replace error: {}", e),
        }
    }
    fn replace_all(&mut self) {
        let (term, replacement) = (self.state.search.clone(), self.state.replace.clone());
        match self
            .state
            .session
            .replace_all(&term, &replacement, self.state.case_sensitive)
        {
            Ok(report) => {
                if report.backup.is_some() {
                    self.state.last_backup_time = Some(Local::now());
                }
                self.state.status = format!("{} Display updated.", report);
            }
            Err(e) => self.state.status = format!("Replace All aborted: {}", e),
        }
        self.state.select(None);
    }
    fn save_edit(&mut self) {
        let Some(dialog) = &self.state.editing else {
            return;
        };
        let index = dialog.index;
        let text = dialog.text.trim_end_matches('\n').to_string();
        match self.state.session.edit(index, &text) {
            Ok(()) => {
                let item = &self.state.session.items()[index];
                self.state.status =
                    format!("Saved changes to '{}' in {}", item.path, item.file_name());
                self.state.editing = None;
                self.state.select(Some(index));
            }
            Err(e) => self.state.status = format!("Save error: {}", e),
        }
    }
}

impl App for AppGui {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Folder:");
                let folder = self
                    .state
                    .session
                    .folder()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                ui.label(folder);
                if ui.button("Browse...").clicked() {
                    self.pick_folder();
                }
                if ui.button("Reload").clicked() {
                    self.reload();
                }
            });
            ui.horizontal(|ui| {
                ui.label("Find:");
                let resp = ui.text_edit_singleline(&mut self.state.search);
                if resp.changed() {
                    self.on_search_changed();
                }
                let has_term = !self.state.search.is_empty();
                if resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) && has_term {
                    self.find_next();
                }
                ui.label("Replace with:");
                ui.text_edit_singleline(&mut self.state.replace);
                if ui
                    .checkbox(&mut self.state.case_sensitive, "Case sensitive")
                    .changed()
                {
                    self.on_search_changed();
                }
                if ui
                    .add_enabled(has_term, egui::Button::new("Find Next"))
                    .clicked()
                {
                    self.find_next();
                }
                let has_match = self.state.session.current_match().is_some();
                if ui
                    .add_enabled(has_match, egui::Button::new("Replace"))
                    .clicked()
                {
                    self.replace_current();
                }
                if ui
                    .add_enabled(has_term, egui::Button::new("Replace All"))
                    .clicked()
                {
                    self.state.confirm_replace_all = true;
                }
            });
            if self.state.confirm_replace_all {
                ui.horizontal(|ui| {
                    ui.label(format!(
                        "Replace all '{}' with '{}' in all loaded files?",
                        self.state.search, self.state.replace
                    ));
                    ui.checkbox(
                        &mut self.state.session.config_mut().backup_before_replace_all,
                        "Zip backup first",
                    );
                    if ui.button("Confirm").clicked() {
                        self.replace_all();
                        self.state.confirm_replace_all = false;
                    }
                    if ui.button("Cancel").clicked() {
                        self.state.status = "'Replace All' cancelled.".into();
                        self.state.confirm_replace_all = false;
                    }
                });
            }
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.state.status);
                if let Some(time) = self.state.last_backup_time {
                    ui.separator();
                    ui.label(format!("Last backup: {}", time.format("%Y-%m-%d %H:%M:%S")));
                }
            });
        });

        let mut pending_select: Option<usize> = None;
        let mut pending_edit: Option<usize> = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            let font = FontId::monospace(13.0);
            let text_color = ui.visuals().text_color();
            let scroll_to = self.state.scroll_to_selected;
            egui::ScrollArea::both()
                .id_source("rows_scroll")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for (i, row) in self.state.session.rows().iter().enumerate() {
                        let sel = Some(i) == self.state.selected;
                        let job = row_job(row, &font, text_color);
                        let resp = ui.add(egui::SelectableLabel::new(sel, job));
                        if sel && scroll_to {
                            resp.scroll_to_me(Some(egui::Align::Center));
                        }
                        if resp.double_clicked() {
                            pending_edit = Some(i);
                        } else if resp.clicked() {
                            pending_select = Some(i);
                        }
                    }
                });
        });
        self.state.scroll_to_selected = false;
        if let Some(i) = pending_select {
            self.state.selected = Some(i);
        }
        if let Some(i) = pending_edit
            && let Some(item) = self.state.session.items().get(i)
        {
            self.state.editing = Some(EditDialog {
                index: i,
                text: item.value.clone(),
            });
            self.state.selected = Some(i);
        }

        let mut save = false;
        let mut cancel = false;
        if let Some(dialog) = &mut self.state.editing {
            let title = self
                .state
                .session
                .items()
                .get(dialog.index)
                .map(|it| format!("Edit Text: {} :: {}", it.file_name(), it.path))
                .unwrap_or_else(|| "Edit Text".to_string());
            egui::Window::new(title)
                .id(egui::Id::new("edit_window"))
                .collapsible(false)
                .default_size([600.0, 400.0])
                .show(ctx, |ui| {
                    let text_color = ui.visuals().text_color();
                    let mut layouter = |ui: &egui::Ui, s: &str, wrap_width: f32| {
                        let mut job = highlight_job(s, &FontId::proportional(14.0), text_color);
                        job.wrap.max_width = wrap_width;
                        ui.fonts(|f| f.layout_job(job))
                    };
                    egui::ScrollArea::vertical()
                        .id_source("edit_scroll")
                        .max_height(320.0)
                        .show(ui, |ui| {
                            ui.add(
                                egui::TextEdit::multiline(&mut dialog.text)
                                    .desired_rows(15)
                                    .desired_width(f32::INFINITY)
                                    .layouter(&mut layouter),
                            );
                        });
                    ui.horizontal(|ui| {
                        if ui.button("Save").clicked() {
                            save = true;
                        }
                        if ui.button("Cancel").clicked() {
                            cancel = true;
                        }
                    });
                });
        }
        if save {
            self.save_edit();
        } else if cancel {
            self.state.editing = None;
        }
    }
}

const FILENAME_COLOR: Color32 = Color32::from_rgb(0x2e, 0x8b, 0x2e);
const PATH_COLOR: Color32 = Color32::from_rgb(0xc8, 0x32, 0x32);
const SEPARATOR_COLOR: Color32 = Color32::GRAY;
const SYMBOL_COLOR: Color32 = Color32::from_rgb(0x32, 0x64, 0xdc);

fn row_job(row: &Row<'_>, font: &FontId, text_color: Color32) -> LayoutJob {
    let mut job = LayoutJob::default();
    let fmt = |color| TextFormat::simple(font.clone(), color);
    job.append(row.file_name, 0.0, fmt(FILENAME_COLOR));
    job.append(" :: ", 0.0, fmt(SEPARATOR_COLOR));
    job.append(row.path, 0.0, fmt(PATH_COLOR));
    job.append(" :: ", 0.0, fmt(SEPARATOR_COLOR));
    for span in yte_core::symbols::spans(&row.preview) {
        let color = if span.symbol { SYMBOL_COLOR } else { text_color };
        job.append(span.text, 0.0, fmt(color));
    }
    job
}

fn highlight_job(text: &str, font: &FontId, text_color: Color32) -> LayoutJob {
    let mut job = LayoutJob::default();
    for span in yte_core::symbols::spans(text) {
        let color = if span.symbol { SYMBOL_COLOR } else { text_color };
        job.append(span.text, 0.0, TextFormat::simple(font.clone(), color));
    }
    job
}

fn main() -> eframe::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let config = Config::load(Path::new(yte_core::config::CONFIG_FILENAME)).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "using default config");
        Config::default()
    });
    let native_options = eframe::NativeOptions {
        viewport: egui::viewport::ViewportBuilder::default()
            .with_inner_size([900.0, 700.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };
    eframe::run_native(
        "YAML Text Viewer/Editor",
        native_options,
        Box::new(|cc| Ok(Box::new(AppGui::new(cc, config)))),
    )
}
