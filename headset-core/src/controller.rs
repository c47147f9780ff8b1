//! Main-loop coordination.
//!
//! One tick = one pass over the three input sources, in a fixed order:
//! radio poll, button poll, display refresh. Nothing blocks; the loop itself
//! is the retry mechanism for every failure. The controller owns the store,
//! the animator and the capability implementations, and reports everything
//! it observed in a [`TickReport`] so the caller can log - it performs no
//! logging of its own.
//!
//! The radio is optional: with `None` the receive step is skipped and the
//! page only changes through [`Controller::select_page`] - one parameterized
//! loop covers both the radio-driven headset and a bench rig with no bonnet
//! fitted.

use heapless::String;

use headset_protocol::{decode, DecodeError, MenuCommand, MAX_PAYLOAD_SIZE};

use crate::flash::FlashAnimator;
use crate::menu::{ActivePage, MenuError, MenuStore};
use crate::traits::input::{Button, ButtonInput};
use crate::traits::radio::{RadioError, RadioTransport};
use crate::traits::surface::{DisplaySurface, ElementId, SurfaceError};

/// What one radio poll produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RxStatus {
    /// Nothing waiting. Carries the running count of consecutive empty
    /// polls - the loop's diagnostic time unit.
    Empty { empty_polls: u32 },
    /// A packet arrived after `empty_polls` empty polls (the counter resets
    /// on receipt).
    Received {
        len: usize,
        /// Payload text, when it was valid UTF-8.
        text: Option<String<MAX_PAYLOAD_SIZE>>,
        empty_polls: u32,
        outcome: RxOutcome,
    },
    /// The transport failed this tick; treated as an empty poll.
    TransportError(RadioError),
    /// No radio configured; the receive step was skipped.
    NoRadio,
}

/// What a received packet did to the menu state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxOutcome {
    /// Decoded and selected; the display now shows this page.
    PageChanged(u16),
    /// Decoded, but the catalog has no such page; display unchanged.
    UnknownPage(u16),
    /// Payload did not decode; display unchanged.
    BadPacket(DecodeError),
}

/// Everything one tick observed, for the caller to log and act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub rx: RxStatus,
    /// Logical button state this tick, indexed by [`Button::index`]. A held
    /// button reports pressed every tick - no debounce, no edge detection.
    pub pressed: [bool; 3],
    /// Buttons whose reads failed this tick (reported as not pressed).
    pub input_faults: [bool; 3],
    /// The page the display refresh drew.
    pub rendered_page: u16,
    pub render_error: Option<SurfaceError>,
}

impl TickReport {
    pub fn is_pressed(&self, button: Button) -> bool {
        self.pressed[button.index()]
    }

    /// All three buttons held at once: the operator shutdown chord.
    pub fn shutdown_requested(&self) -> bool {
        self.pressed.iter().all(|&p| p)
    }
}

/// The coordinator: polls the radio and buttons, feeds the store, drives the
/// display refresh.
pub struct Controller<R, B, D> {
    radio: Option<R>,
    buttons: B,
    surface: D,
    store: MenuStore,
    flash: FlashAnimator,
    empty_polls: u32,
}

impl<R, B, D> Controller<R, B, D>
where
    R: RadioTransport,
    B: ButtonInput,
    D: DisplaySurface,
{
    pub fn new(radio: Option<R>, buttons: B, surface: D, store: MenuStore) -> Self {
        Self {
            radio,
            buttons,
            surface,
            store,
            flash: FlashAnimator::new(),
            empty_polls: 0,
        }
    }

    /// Select a page outside the packet path (startup default, test rigs).
    pub fn select_page(&mut self, number: u16) -> Result<(), MenuError> {
        self.store.select_page(number)
    }

    /// The active snapshot, for callers that render or log outside a tick.
    pub fn active_page(&self) -> &ActivePage {
        self.store.active()
    }

    /// Begin a flash cycle on a display element.
    pub fn start_flash(&mut self, element: ElementId, start_count: u8, now_ms: u64) {
        self.flash.start(element, start_count, now_ms);
    }

    /// Run one tick: radio, buttons, then display refresh.
    pub fn tick(&mut self, now_ms: u64) -> TickReport {
        let rx = self.poll_radio();
        let (pressed, input_faults) = self.poll_buttons();

        self.flash.poll(now_ms, &mut self.surface);
        let render_error = self.refresh_display();

        TickReport {
            rx,
            pressed,
            input_faults,
            rendered_page: self.store.active().number,
            render_error,
        }
    }

    fn poll_radio(&mut self) -> RxStatus {
        let Some(radio) = self.radio.as_mut() else {
            return RxStatus::NoRadio;
        };

        let mut buf = [0u8; MAX_PAYLOAD_SIZE];
        match radio.try_receive(&mut buf) {
            Ok(Some(len)) => {
                let raw = &buf[..len.min(MAX_PAYLOAD_SIZE)];
                let empty_polls = core::mem::take(&mut self.empty_polls);

                let text = core::str::from_utf8(raw).ok().map(owned_text);
                let outcome = match decode(raw) {
                    Ok(MenuCommand::PageSelect(number)) => {
                        match self.store.select_page(number) {
                            Ok(()) => RxOutcome::PageChanged(number),
                            Err(_) => RxOutcome::UnknownPage(number),
                        }
                    }
                    Err(e) => RxOutcome::BadPacket(e),
                };

                RxStatus::Received {
                    len,
                    text,
                    empty_polls,
                    outcome,
                }
            }
            Ok(None) => {
                self.empty_polls = self.empty_polls.saturating_add(1);
                RxStatus::Empty {
                    empty_polls: self.empty_polls,
                }
            }
            Err(e) => {
                // surfaced as an empty poll; next tick tries again
                self.empty_polls = self.empty_polls.saturating_add(1);
                RxStatus::TransportError(e)
            }
        }
    }

    fn poll_buttons(&mut self) -> ([bool; 3], [bool; 3]) {
        let mut pressed = [false; 3];
        let mut faults = [false; 3];
        for button in Button::ALL {
            match self.buttons.is_pressed(button) {
                Ok(held) => pressed[button.index()] = held,
                // fail-safe: an unreadable button is not pressed
                Err(_) => faults[button.index()] = true,
            }
        }
        (pressed, faults)
    }

    fn refresh_display(&mut self) -> Option<SurfaceError> {
        if let Err(e) = self.surface.render_page(self.store.active()) {
            return Some(e);
        }
        self.surface.present().err()
    }
}

fn owned_text(text: &str) -> String<MAX_PAYLOAD_SIZE> {
    let mut out = String::new();
    let _ = out.push_str(text);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::{MenuPage, PageCatalog};
    use crate::traits::input::InputError;
    use std::collections::VecDeque;

    // -- scripted capability implementations ------------------------------

    #[derive(Default)]
    struct ScriptedRadio {
        script: VecDeque<Result<Option<Vec<u8>>, RadioError>>,
    }

    impl ScriptedRadio {
        fn packet(mut self, bytes: &[u8]) -> Self {
            self.script.push_back(Ok(Some(bytes.to_vec())));
            self
        }

        fn empty(mut self) -> Self {
            self.script.push_back(Ok(None));
            self
        }

        fn error(mut self, e: RadioError) -> Self {
            self.script.push_back(Err(e));
            self
        }
    }

    impl RadioTransport for ScriptedRadio {
        fn try_receive(&mut self, buf: &mut [u8]) -> Result<Option<usize>, RadioError> {
            match self.script.pop_front() {
                Some(Ok(Some(bytes))) => {
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok(Some(bytes.len()))
                }
                Some(Ok(None)) | None => Ok(None),
                Some(Err(e)) => Err(e),
            }
        }
    }

    #[derive(Default)]
    struct HeldButtons {
        held: [bool; 3],
        failing: [bool; 3],
    }

    impl ButtonInput for HeldButtons {
        fn is_pressed(&mut self, button: Button) -> Result<bool, InputError> {
            if self.failing[button.index()] {
                return Err(InputError::Read);
            }
            Ok(self.held[button.index()])
        }
    }

    /// Records every render and color swap so scenarios can assert on the
    /// exact call sequence.
    #[derive(Default)]
    struct RecordingSurface {
        renders: Vec<ActivePage>,
        swaps: Vec<ElementId>,
        presents: usize,
    }

    impl DisplaySurface for RecordingSurface {
        fn render_page(&mut self, page: &ActivePage) -> Result<(), SurfaceError> {
            self.renders.push(page.clone());
            Ok(())
        }

        fn swap_colors(&mut self, element: ElementId) {
            self.swaps.push(element);
        }

        fn viewport_height(&self) -> u32 {
            720
        }

        fn present(&mut self) -> Result<(), SurfaceError> {
            self.presents += 1;
            Ok(())
        }
    }

    // -- fixtures ----------------------------------------------------------

    fn lights() -> MenuPage {
        MenuPage::new(
            30,
            "Lights",
            [
                "Knight R1",
                "Rainbow",
                "Dual Bnc",
                "Auto Off",
                "Knight R2",
                "Short Cir",
                "Zig Zag",
                "Auto On",
            ],
        )
    }

    fn catalog() -> PageCatalog {
        let mut catalog = PageCatalog::new();
        catalog.push(lights()).unwrap();
        catalog
            .push(MenuPage::new(
                70,
                "Shows",
                [
                    "Rocket Man",
                    "Leia Holo",
                    "Zap",
                    "Open Zapper",
                    "Fav Things",
                    "TBD",
                    "TBD",
                    "Close Zapper",
                ],
            ))
            .unwrap();
        catalog
            .push(MenuPage::new(
                110,
                "Open Menu 11",
                [
                    "<OPEN1>", "<OPEN2>", "<OPEN3>", "<OPEN4>", "<OPEN5>", "<OPEN6>", "<OPEN7>",
                    "<OPEN8>",
                ],
            ))
            .unwrap();
        catalog
    }

    fn controller(
        radio: ScriptedRadio,
    ) -> Controller<ScriptedRadio, HeldButtons, RecordingSurface> {
        let store = MenuStore::new(catalog()).unwrap();
        let mut controller = Controller::new(
            Some(radio),
            HeldButtons::default(),
            RecordingSurface::default(),
            store,
        );
        // boot default, as the firmware configures it
        controller.select_page(70).unwrap();
        controller
    }

    // -- scenarios ---------------------------------------------------------

    #[test]
    fn test_page_select_packet_changes_render() {
        let mut controller = controller(ScriptedRadio::default().packet(b"30"));

        let report = controller.tick(0);

        match &report.rx {
            RxStatus::Received { text, outcome, .. } => {
                assert_eq!(text.as_ref().unwrap().as_str(), "30");
                assert_eq!(*outcome, RxOutcome::PageChanged(30));
            }
            other => panic!("unexpected rx status: {other:?}"),
        }
        assert_eq!(report.rendered_page, 30);

        let rendered = controller.surface.renders.last().unwrap();
        assert_eq!(rendered.title.as_str(), "Lights");
        assert_eq!(rendered.items[0].as_str(), "Knight R1");
        assert_eq!(rendered.items[7].as_str(), "Auto On");
        assert_eq!(controller.surface.presents, 1);
    }

    #[test]
    fn test_invalid_utf8_leaves_page() {
        // lone continuation byte
        let mut controller = controller(ScriptedRadio::default().packet(&[0x80]));

        let report = controller.tick(0);

        match &report.rx {
            RxStatus::Received { text, outcome, .. } => {
                assert!(text.is_none());
                assert_eq!(*outcome, RxOutcome::BadPacket(DecodeError::NotUtf8));
            }
            other => panic!("unexpected rx status: {other:?}"),
        }
        assert_eq!(report.rendered_page, 70);
        assert!(controller
            .surface
            .renders
            .iter()
            .all(|page| page.number == 70));
    }

    #[test]
    fn test_empty_polls_count_and_reset() {
        let radio = ScriptedRadio::default()
            .empty()
            .empty()
            .empty()
            .packet(b"110")
            .empty();
        let mut controller = controller(radio);

        for expected in 1..=3u32 {
            let report = controller.tick(0);
            assert_eq!(
                report.rx,
                RxStatus::Empty {
                    empty_polls: expected
                }
            );
        }

        let report = controller.tick(0);
        match &report.rx {
            RxStatus::Received {
                empty_polls,
                outcome,
                ..
            } => {
                assert_eq!(*empty_polls, 3);
                assert_eq!(*outcome, RxOutcome::PageChanged(110));
            }
            other => panic!("unexpected rx status: {other:?}"),
        }

        // counter restarted after the receive
        let report = controller.tick(0);
        assert_eq!(report.rx, RxStatus::Empty { empty_polls: 1 });
    }

    #[test]
    fn test_unknown_page_keeps_stale_display() {
        let mut controller = controller(ScriptedRadio::default().packet(b"42"));

        let report = controller.tick(0);

        match &report.rx {
            RxStatus::Received { outcome, .. } => {
                assert_eq!(*outcome, RxOutcome::UnknownPage(42));
            }
            other => panic!("unexpected rx status: {other:?}"),
        }
        assert_eq!(report.rendered_page, 70);
    }

    #[test]
    fn test_held_button_reports_every_tick() {
        let mut controller = controller(
            ScriptedRadio::default()
                .empty()
                .empty()
                .empty()
                .empty()
                .empty(),
        );
        controller.buttons.held[Button::A.index()] = true;

        for _ in 0..5 {
            let report = controller.tick(0);
            assert!(report.is_pressed(Button::A));
            assert!(!report.is_pressed(Button::B));
        }
    }

    #[test]
    fn test_transport_error_does_not_stop_loop() {
        let radio = ScriptedRadio::default()
            .error(RadioError::Bus)
            .packet(b"30");
        let mut controller = controller(radio);

        let report = controller.tick(0);
        assert_eq!(report.rx, RxStatus::TransportError(RadioError::Bus));
        // the failed poll still rendered the stale page
        assert_eq!(report.rendered_page, 70);

        let report = controller.tick(0);
        assert_eq!(report.rendered_page, 30);
    }

    #[test]
    fn test_failed_button_read_is_not_pressed() {
        let mut controller = controller(ScriptedRadio::default());
        controller.buttons.failing[Button::B.index()] = true;

        let report = controller.tick(0);
        assert!(!report.is_pressed(Button::B));
        assert!(report.input_faults[Button::B.index()]);
        assert!(!report.input_faults[Button::A.index()]);
    }

    #[test]
    fn test_shutdown_chord() {
        let mut controller = controller(ScriptedRadio::default());
        let report = controller.tick(0);
        assert!(!report.shutdown_requested());

        controller.buttons.held = [true, true, true];
        let report = controller.tick(0);
        assert!(report.shutdown_requested());
    }

    #[test]
    fn test_no_radio_variant_still_renders() {
        let store = MenuStore::new(catalog()).unwrap();
        let mut controller: Controller<ScriptedRadio, _, _> = Controller::new(
            None,
            HeldButtons::default(),
            RecordingSurface::default(),
            store,
        );

        let report = controller.tick(0);
        assert_eq!(report.rx, RxStatus::NoRadio);
        assert_eq!(controller.surface.renders.len(), 1);

        // page changes still possible through the direct path
        controller.select_page(110).unwrap();
        assert_eq!(controller.active_page().number, 110);
        let report = controller.tick(0);
        assert_eq!(report.rendered_page, 110);
    }

    #[test]
    fn test_flash_swaps_flow_through_tick() {
        let mut controller = controller(
            ScriptedRadio::default()
                .empty()
                .empty()
                .empty(),
        );
        controller.start_flash(ElementId::Item(6), 0, 0);
        controller.start_flash(ElementId::Item(7), 16, 0);

        controller.tick(0);
        assert_eq!(controller.surface.swaps.len(), 2);

        // same period: no further swaps
        controller.tick(500);
        assert_eq!(controller.surface.swaps.len(), 2);

        controller.tick(1000);
        assert_eq!(controller.surface.swaps.len(), 4);
    }
}
