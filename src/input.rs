use crate::page::section_for_digit;
use crate::shell::ShellKind;
use crate::theme::Section;
use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum InputEvent {
    Key { key: KeyCode, mods: KeyModifiers },
    Pointer(PointerEvent),
    Resize(u16, u16),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PointerEvent {
    Moved(u16, u16),
    Down(u16, u16),
    Up,
    Wheel(i32),
}

fn pointer_event(m: MouseEvent) -> Option<PointerEvent> {
    match m.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) => Some(PointerEvent::Moved(m.column, m.row)),
        MouseEventKind::Down(MouseButton::Left) => Some(PointerEvent::Down(m.column, m.row)),
        MouseEventKind::Up(MouseButton::Left) => Some(PointerEvent::Up),
        MouseEventKind::ScrollUp => Some(PointerEvent::Wheel(-3)),
        MouseEventKind::ScrollDown => Some(PointerEvent::Wheel(3)),
        _ => None,
    }
}

/// Appends `ev`, folding runs of pointer moves (and of resizes) into the
/// latest one so a burst of reports costs one update.
pub(crate) fn push_coalesced(out: &mut Vec<InputEvent>, ev: InputEvent) {
    let fold = matches!(
        (out.last(), ev),
        (
            Some(InputEvent::Pointer(PointerEvent::Moved(..))),
            InputEvent::Pointer(PointerEvent::Moved(..))
        ) | (Some(InputEvent::Resize(..)), InputEvent::Resize(..))
    );
    match out.last_mut() {
        Some(last) if fold => *last = ev,
        _ => out.push(ev),
    }
}

/// Waits up to `timeout` for the first event, then drains whatever else is
/// already queued.
pub(crate) fn collect_input(timeout: Duration) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();
    let mut wait = timeout;
    while event::poll(wait)? {
        wait = Duration::ZERO;
        let ev = match event::read()? {
            Event::Key(k) if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat => {
                InputEvent::Key {
                    key: k.code,
                    mods: k.modifiers,
                }
            }
            Event::Mouse(m) => match pointer_event(m) {
                Some(p) => InputEvent::Pointer(p),
                None => continue,
            },
            Event::Resize(c, r) => InputEvent::Resize(c, r),
            _ => continue,
        };
        push_coalesced(&mut out, ev);
        if out.len() >= 64 {
            break;
        }
    }
    Ok(out)
}

/// Which layer currently owns the keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Focus {
    Boot,
    Page,
    Terminal,
    Detail,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum UiAction {
    Quit,
    SkipBoot,
    Scroll(i32),
    PageScroll(i32),
    Jump(Section),
    Reboot,
    OpenShell(ShellKind),
    Close,
    Type(char),
    Backspace,
    Complete,
    Submit,
    CarouselPrev,
    CarouselNext,
    ToggleAutoplay,
    OpenDetail,
}

pub(crate) fn map_key(focus: Focus, key: KeyCode, mods: KeyModifiers) -> Option<UiAction> {
    if mods.contains(KeyModifiers::CONTROL) && matches!(key, KeyCode::Char('c') | KeyCode::Char('C')) {
        return Some(UiAction::Quit);
    }

    match focus {
        Focus::Boot => Some(UiAction::SkipBoot),
        Focus::Terminal => match key {
            KeyCode::Esc => Some(UiAction::Close),
            KeyCode::Enter => Some(UiAction::Submit),
            KeyCode::Tab => Some(UiAction::Complete),
            KeyCode::Backspace => Some(UiAction::Backspace),
            KeyCode::Char(ch) if !ch.is_control() => Some(UiAction::Type(ch)),
            _ => None,
        },
        Focus::Detail => match key {
            KeyCode::Esc | KeyCode::Enter => Some(UiAction::Close),
            KeyCode::Char('q') | KeyCode::Char('Q') => Some(UiAction::Quit),
            _ => None,
        },
        Focus::Page => match key {
            KeyCode::Char('q') | KeyCode::Char('Q') => Some(UiAction::Quit),
            KeyCode::Char('j') | KeyCode::Down => Some(UiAction::Scroll(1)),
            KeyCode::Char('k') | KeyCode::Up => Some(UiAction::Scroll(-1)),
            KeyCode::PageDown | KeyCode::Char(' ') => Some(UiAction::PageScroll(1)),
            KeyCode::PageUp => Some(UiAction::PageScroll(-1)),
            KeyCode::Home | KeyCode::Char('g') => Some(UiAction::Jump(Section::Hero)),
            KeyCode::End | KeyCode::Char('G') => Some(UiAction::Jump(Section::Contact)),
            KeyCode::Char('t') | KeyCode::Char('T') => Some(UiAction::OpenShell(ShellKind::Hero)),
            KeyCode::Char('s') | KeyCode::Char('S') => Some(UiAction::OpenShell(ShellKind::Skills)),
            KeyCode::Char('c') | KeyCode::Char('C') => Some(UiAction::OpenShell(ShellKind::Contact)),
            KeyCode::Left | KeyCode::Char('h') => Some(UiAction::CarouselPrev),
            KeyCode::Right | KeyCode::Char('l') => Some(UiAction::CarouselNext),
            KeyCode::Char('a') | KeyCode::Char('A') => Some(UiAction::ToggleAutoplay),
            KeyCode::Char('r') | KeyCode::Char('R') => Some(UiAction::Reboot),
            KeyCode::Enter => Some(UiAction::OpenDetail),
            KeyCode::Char(d) if d.is_ascii_digit() => section_for_digit(d).map(UiAction::Jump),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(focus: Focus, code: KeyCode) -> Option<UiAction> {
        map_key(focus, code, KeyModifiers::NONE)
    }

    #[test]
    fn pointer_moves_coalesce() {
        let mut out = Vec::new();
        push_coalesced(&mut out, InputEvent::Pointer(PointerEvent::Moved(1, 1)));
        push_coalesced(&mut out, InputEvent::Pointer(PointerEvent::Moved(2, 1)));
        push_coalesced(&mut out, InputEvent::Pointer(PointerEvent::Down(2, 1)));
        push_coalesced(&mut out, InputEvent::Pointer(PointerEvent::Moved(3, 1)));
        push_coalesced(&mut out, InputEvent::Pointer(PointerEvent::Moved(4, 2)));
        push_coalesced(&mut out, InputEvent::Resize(80, 24));
        push_coalesced(&mut out, InputEvent::Resize(100, 30));
        assert_eq!(
            out,
            vec![
                InputEvent::Pointer(PointerEvent::Moved(2, 1)),
                InputEvent::Pointer(PointerEvent::Down(2, 1)),
                InputEvent::Pointer(PointerEvent::Moved(4, 2)),
                InputEvent::Resize(100, 30),
            ]
        );
    }

    #[test]
    fn mouse_reports_map_to_pointer_events() {
        let m = |kind| MouseEvent {
            kind,
            column: 5,
            row: 7,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(pointer_event(m(MouseEventKind::Moved)), Some(PointerEvent::Moved(5, 7)));
        assert_eq!(
            pointer_event(m(MouseEventKind::Drag(MouseButton::Left))),
            Some(PointerEvent::Moved(5, 7))
        );
        assert_eq!(
            pointer_event(m(MouseEventKind::Down(MouseButton::Left))),
            Some(PointerEvent::Down(5, 7))
        );
        assert_eq!(pointer_event(m(MouseEventKind::Up(MouseButton::Left))), Some(PointerEvent::Up));
        assert_eq!(pointer_event(m(MouseEventKind::Down(MouseButton::Right))), None);
        assert_eq!(pointer_event(m(MouseEventKind::ScrollDown)), Some(PointerEvent::Wheel(3)));
    }

    #[test]
    fn page_keys() {
        assert_eq!(key(Focus::Page, KeyCode::Char('q')), Some(UiAction::Quit));
        assert_eq!(key(Focus::Page, KeyCode::Char('4')), Some(UiAction::Jump(Section::Skills)));
        assert_eq!(key(Focus::Page, KeyCode::Char('9')), None);
        assert_eq!(
            key(Focus::Page, KeyCode::Char('s')),
            Some(UiAction::OpenShell(ShellKind::Skills))
        );
        assert_eq!(key(Focus::Page, KeyCode::Right), Some(UiAction::CarouselNext));
        assert_eq!(key(Focus::Page, KeyCode::Char('a')), Some(UiAction::ToggleAutoplay));
        assert_eq!(key(Focus::Page, KeyCode::Char('r')), Some(UiAction::Reboot));
        assert_eq!(key(Focus::Detail, KeyCode::Char('r')), None);
    }

    #[test]
    fn terminal_swallows_letters() {
        assert_eq!(key(Focus::Terminal, KeyCode::Char('q')), Some(UiAction::Type('q')));
        assert_eq!(key(Focus::Terminal, KeyCode::Char('1')), Some(UiAction::Type('1')));
        assert_eq!(key(Focus::Terminal, KeyCode::Tab), Some(UiAction::Complete));
        assert_eq!(key(Focus::Terminal, KeyCode::Esc), Some(UiAction::Close));
    }

    #[test]
    fn ctrl_c_always_quits() {
        for focus in [Focus::Boot, Focus::Page, Focus::Terminal, Focus::Detail] {
            assert_eq!(
                map_key(focus, KeyCode::Char('c'), KeyModifiers::CONTROL),
                Some(UiAction::Quit)
            );
        }
    }

    #[test]
    fn any_key_skips_boot() {
        assert_eq!(key(Focus::Boot, KeyCode::Char('x')), Some(UiAction::SkipBoot));
        assert_eq!(key(Focus::Boot, KeyCode::Esc), Some(UiAction::SkipBoot));
    }
}
