use mixdeck_error::{ErrorExt, StatusCode};
use mixdeck_theme::{Appearance, Error, Palette, Scope, ThemeExt, ThemeSetting, use_theme};

/// Toolbar with a dark-mode toggle.
struct Toolbar {
    scope: Scope,
}

impl Toolbar {
    fn mount(parent: &Scope) -> Self {
        Self {
            scope: parent.child(),
        }
    }

    fn choose(&self, setting: ThemeSetting) { self.scope.theme().unwrap().set(setting); }
}

/// Deck that paints itself from the current theme.
struct Deck {
    scope: Scope,
}

impl Deck {
    fn mount(parent: &Scope) -> Self {
        Self {
            scope: parent.child().child(),
        }
    }

    fn background(&self, system: Appearance) -> mixdeck_theme::Rgba {
        use_theme(&self.scope).unwrap().palette(system).background
    }
}

#[test]
fn setting_from_one_consumer_is_read_by_another() {
    mixdeck_common_telemetry::logging::init_default_ut_logging();

    let root = Scope::root().provide_theme(ThemeSetting::System);
    let toolbar = Toolbar::mount(&root);
    let deck = Deck::mount(&root);

    assert_eq!(
        deck.background(Appearance::Light),
        Palette::light().background
    );

    toolbar.choose(ThemeSetting::Dark);

    assert_eq!(deck.scope.theme().unwrap().read(), ThemeSetting::Dark);
    assert_eq!(deck.background(Appearance::Light), Palette::dark().background);
}

#[test]
fn consumer_mounted_outside_provider_fails_fast() {
    mixdeck_common_telemetry::logging::init_default_ut_logging();

    let _provisioned = Scope::root().provide_theme(ThemeSetting::Light);
    let stray = Deck::mount(&Scope::root());

    for _ in 0..5 {
        let err = stray.scope.theme().unwrap_err();
        assert!(matches!(err, Error::ContextUnavailable { .. }));
        assert_eq!(err.status_code(), StatusCode::FailedPrecondition);
        assert!(err.output_msg().contains("outside of a ThemeProvider"));
    }
}
