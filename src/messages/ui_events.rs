//! UI events - messages from UI layer to App layer

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    // Panel navigation
    NextPanel,
    PrevPanel,
    CursorUp,
    CursorDown,

    // Input editing
    EditField(InputField),
    NextField,
    StopEditing,
    CharInput(char),
    Backspace,
    CursorLeft,
    CursorRight,
    Submit,

    // Projects
    Refresh,
    DeleteProject,
    ViewTasks,
    ViewFiles,
    UploadFile,

    // Tasks
    ToggleTask,

    // Files
    ViewFile,
    CloseViewedFile,
    ViewerScrollUp,
    ViewerScrollDown,

    // File picker
    OpenFilePicker,
    PickerChar(char),
    PickerBackspace,
    PickerAutocomplete,
    ConfirmPicker,
    CancelPicker,

    // Popups
    DismissNotifications,
    ToggleHelp,
    CloseHelp,

    // System
    Quit,
}

/// Active panel in the UI (needed for context-aware event mapping)
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Panel {
    #[default]
    Projects,
    Tasks,
    Files,
}

impl Panel {
    pub fn next(&self) -> Panel {
        match self {
            Panel::Projects => Panel::Tasks,
            Panel::Tasks => Panel::Files,
            Panel::Files => Panel::Projects,
        }
    }

    pub fn prev(&self) -> Panel {
        match self {
            Panel::Projects => Panel::Files,
            Panel::Tasks => Panel::Projects,
            Panel::Files => Panel::Tasks,
        }
    }
}

/// Input mode
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Editing,
}

/// Text field being edited
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum InputField {
    #[default]
    Name,
    Description,
    NewTask,
}

impl InputField {
    /// Tab order inside the create-project form
    pub fn next(&self) -> InputField {
        match self {
            InputField::Name => InputField::Description,
            InputField::Description => InputField::Name,
            InputField::NewTask => InputField::NewTask,
        }
    }
}

/// UI context the key mapping depends on
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyContext {
    pub active_panel: Panel,
    pub input_mode: InputMode,
    pub show_help: bool,
    pub show_file_picker: bool,
    pub viewing_file: bool,
}

/// Convert a key event to a UiEvent based on current UI context
pub fn key_to_ui_event(key: KeyEvent, ctx: KeyContext) -> Option<UiEvent> {
    use crossterm::event::KeyEventKind;

    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(UiEvent::Quit);
    }

    // Popups first
    if ctx.show_help {
        return Some(UiEvent::CloseHelp);
    }

    if ctx.show_file_picker {
        return match key.code {
            KeyCode::Esc => Some(UiEvent::CancelPicker),
            KeyCode::Enter => Some(UiEvent::ConfirmPicker),
            KeyCode::Tab => Some(UiEvent::PickerAutocomplete),
            KeyCode::Backspace => Some(UiEvent::PickerBackspace),
            KeyCode::Char(c) => Some(UiEvent::PickerChar(c)),
            _ => None,
        };
    }

    if ctx.viewing_file && ctx.input_mode == InputMode::Normal {
        return match key.code {
            KeyCode::Esc | KeyCode::Char('c') => Some(UiEvent::CloseViewedFile),
            KeyCode::Up | KeyCode::Char('k') => Some(UiEvent::ViewerScrollUp),
            KeyCode::Down | KeyCode::Char('j') => Some(UiEvent::ViewerScrollDown),
            KeyCode::Char('q') => Some(UiEvent::Quit),
            _ => None,
        };
    }

    match ctx.input_mode {
        InputMode::Normal => normal_mode_keys(key, ctx.active_panel),
        InputMode::Editing => match key.code {
            KeyCode::Esc => Some(UiEvent::StopEditing),
            KeyCode::Left => Some(UiEvent::CursorLeft),
            KeyCode::Right => Some(UiEvent::CursorRight),
            KeyCode::Backspace => Some(UiEvent::Backspace),
            KeyCode::Tab => Some(UiEvent::NextField),
            KeyCode::Enter => Some(UiEvent::Submit),
            KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
            _ => None,
        },
    }
}

/// Handle keys outside of text editing
fn normal_mode_keys(key: KeyEvent, active_panel: Panel) -> Option<UiEvent> {
    match key.code {
        KeyCode::Char('q') => Some(UiEvent::Quit),
        KeyCode::Char('?') => Some(UiEvent::ToggleHelp),
        KeyCode::Esc => Some(UiEvent::DismissNotifications),
        KeyCode::Tab => Some(UiEvent::NextPanel),
        KeyCode::BackTab => Some(UiEvent::PrevPanel),
        KeyCode::Up | KeyCode::Char('k') => Some(UiEvent::CursorUp),
        KeyCode::Down | KeyCode::Char('j') => Some(UiEvent::CursorDown),
        KeyCode::Char('n') => Some(UiEvent::EditField(InputField::Name)),
        KeyCode::Char('r') => Some(UiEvent::Refresh),
        KeyCode::Char('p') => Some(UiEvent::OpenFilePicker),
        KeyCode::Char('u') => Some(UiEvent::UploadFile),
        KeyCode::Char('t') => Some(UiEvent::ViewTasks),
        KeyCode::Char('f') => Some(UiEvent::ViewFiles),
        KeyCode::Char('a') => Some(UiEvent::EditField(InputField::NewTask)),
        KeyCode::Char('x') | KeyCode::Delete if active_panel == Panel::Projects => {
            Some(UiEvent::DeleteProject)
        }
        KeyCode::Enter => match active_panel {
            Panel::Projects => Some(UiEvent::ViewTasks),
            Panel::Tasks => Some(UiEvent::ToggleTask),
            Panel::Files => Some(UiEvent::ViewFile),
        },
        KeyCode::Char(' ') if active_panel == Panel::Tasks => Some(UiEvent::ToggleTask),
        KeyCode::Char('v') if active_panel == Panel::Files => Some(UiEvent::ViewFile),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_enter_depends_on_panel() {
        let mut ctx = KeyContext::default();
        assert_eq!(key_to_ui_event(press(KeyCode::Enter), ctx), Some(UiEvent::ViewTasks));
        ctx.active_panel = Panel::Tasks;
        assert_eq!(key_to_ui_event(press(KeyCode::Enter), ctx), Some(UiEvent::ToggleTask));
        ctx.active_panel = Panel::Files;
        assert_eq!(key_to_ui_event(press(KeyCode::Enter), ctx), Some(UiEvent::ViewFile));
    }

    #[test]
    fn test_delete_only_from_projects_panel() {
        let mut ctx = KeyContext::default();
        assert_eq!(
            key_to_ui_event(press(KeyCode::Char('x')), ctx),
            Some(UiEvent::DeleteProject)
        );
        ctx.active_panel = Panel::Files;
        assert_eq!(key_to_ui_event(press(KeyCode::Char('x')), ctx), None);
    }

    #[test]
    fn test_editing_mode_captures_characters() {
        let ctx = KeyContext {
            input_mode: InputMode::Editing,
            ..Default::default()
        };
        assert_eq!(
            key_to_ui_event(press(KeyCode::Char('q')), ctx),
            Some(UiEvent::CharInput('q'))
        );
        assert_eq!(key_to_ui_event(press(KeyCode::Enter), ctx), Some(UiEvent::Submit));
    }

    #[test]
    fn test_viewer_and_picker_take_precedence() {
        let ctx = KeyContext {
            viewing_file: true,
            ..Default::default()
        };
        assert_eq!(
            key_to_ui_event(press(KeyCode::Esc), ctx),
            Some(UiEvent::CloseViewedFile)
        );

        let ctx = KeyContext {
            show_file_picker: true,
            viewing_file: true,
            ..Default::default()
        };
        assert_eq!(
            key_to_ui_event(press(KeyCode::Tab), ctx),
            Some(UiEvent::PickerAutocomplete)
        );
    }

    #[test]
    fn test_ctrl_c_always_quits() {
        let ctx = KeyContext {
            input_mode: InputMode::Editing,
            ..Default::default()
        };
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_to_ui_event(key, ctx), Some(UiEvent::Quit));
    }
}
