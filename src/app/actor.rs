//! App actor - message loop processing UI events and network responses

use tokio::sync::mpsc;

use crate::app::state::AppState;
use crate::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};

/// App actor that processes UI events and network responses
pub struct AppActor {
    state: AppState,
    network_tx: mpsc::UnboundedSender<NetworkCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
}

impl AppActor {
    pub fn new(
        network_tx: mpsc::UnboundedSender<NetworkCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
    ) -> Self {
        AppActor {
            state: AppState::new(),
            network_tx,
            render_tx,
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut net_rx: mpsc::UnboundedReceiver<NetworkResponse>,
    ) {
        // Initial load
        let cmd = self.state.load_projects();
        self.send(cmd);
        let _ = self.render_tx.send(self.state.to_render_state());

        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    if self.handle_ui_event(event) {
                        // Quit signal received
                        let _ = self.network_tx.send(NetworkCommand::Shutdown);
                        break;
                    }
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                Some(response) = net_rx.recv() => {
                    let follow_ups = self.state.handle_response(response);
                    self.send_all(follow_ups);
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                else => break,
            }
        }
    }

    fn send(&self, cmd: NetworkCommand) {
        if self.network_tx.send(cmd).is_err() {
            tracing::warn!("Network actor is gone, dropping command");
        }
    }

    fn send_all(&self, cmds: impl IntoIterator<Item = NetworkCommand>) {
        for cmd in cmds {
            self.send(cmd);
        }
    }

    fn send_opt(&self, cmd: Option<NetworkCommand>) {
        if let Some(cmd) = cmd {
            self.send(cmd);
        }
    }

    /// Handle a UI event, returns true if quit was requested
    fn handle_ui_event(&mut self, event: UiEvent) -> bool {
        match event {
            // Panel navigation
            UiEvent::NextPanel => self.state.next_panel(),
            UiEvent::PrevPanel => self.state.prev_panel(),
            UiEvent::CursorUp => self.state.cursor_up(),
            UiEvent::CursorDown => self.state.cursor_down(),

            // Input editing
            UiEvent::EditField(field) => self.state.start_editing(field),
            UiEvent::NextField => self.state.next_field(),
            UiEvent::StopEditing => self.state.stop_editing(),
            UiEvent::CharInput(c) => self.state.enter_char(c),
            UiEvent::Backspace => self.state.delete_char(),
            UiEvent::CursorLeft => self.state.move_cursor_left(),
            UiEvent::CursorRight => self.state.move_cursor_right(),
            UiEvent::Submit => {
                let cmd = self.state.submit();
                self.send_opt(cmd);
            }

            // Projects
            UiEvent::Refresh => {
                let cmd = self.state.load_projects();
                self.send(cmd);
            }
            UiEvent::DeleteProject => {
                let cmd = self.state.delete_highlighted();
                self.send_opt(cmd);
            }
            UiEvent::ViewTasks => {
                let cmds = self.state.view_tasks_of_highlighted();
                self.send_all(cmds);
            }
            UiEvent::ViewFiles => {
                let cmd = self.state.view_files_of_highlighted();
                self.send_opt(cmd);
            }
            UiEvent::UploadFile => {
                let cmd = self.state.upload_to_highlighted();
                self.send_opt(cmd);
            }

            // Tasks
            UiEvent::ToggleTask => {
                let cmd = self.state.toggle_highlighted_task();
                self.send_opt(cmd);
            }

            // Files
            UiEvent::ViewFile => {
                let cmd = self.state.view_highlighted_file();
                self.send_opt(cmd);
            }
            UiEvent::CloseViewedFile => self.state.close_viewed_file(),
            UiEvent::ViewerScrollUp => self.state.viewer_scroll_up(),
            UiEvent::ViewerScrollDown => self.state.viewer_scroll_down(),

            // File picker
            UiEvent::OpenFilePicker => self.state.open_file_picker(),
            UiEvent::PickerChar(c) => self.state.picker_char(c),
            UiEvent::PickerBackspace => self.state.picker_backspace(),
            UiEvent::PickerAutocomplete => self.state.picker_autocomplete(),
            UiEvent::ConfirmPicker => self.state.confirm_picker(),
            UiEvent::CancelPicker => self.state.cancel_picker(),

            // Popups
            UiEvent::DismissNotifications => self.state.dismiss_notifications(),
            UiEvent::ToggleHelp => self.state.toggle_help(),
            UiEvent::CloseHelp => self.state.close_help(),

            // System
            UiEvent::Quit => return true,
        }

        false
    }
}
