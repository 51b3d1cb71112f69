//! ChromeBackend tests against a real headless Chrome.
//!
//! A small local page stands in for the upload site: a text field, a select
//! whose option labels carry extra whitespace, a hidden element, a disabled
//! button, a scoped textarea and a file input.
//!
//! Run with: `cargo test --test browser_chrome_tests -- --ignored`

use camino::Utf8PathBuf;
use imgbb_uploader::{
    BrowserError, BrowserSession, ChromeBackend, Condition, Locator, UiBackend, Waiter,
};
use std::fs;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const FIXTURE_HTML: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>fixture</title></head>
<body>
  <form onsubmit="return false">
    <input name="login-subject" type="text">
    <select id="album">
      <option value="a1">Holiday   Trip</option>
      <option value="a2">Work</option>
    </select>
    <input id="changed" value="">
    <div id="hidden" style="display:none">hidden</div>
    <div id="collapsed" style="width:0;height:0;overflow:hidden"></div>
    <button id="disabled" type="button" disabled>Nope</button>
    <button id="enabled" type="button"
            onclick="document.getElementById('clicked').value = 'yes'">Go</button>
    <input id="clicked" value="">
    <div class="panel extra">
      <textarea name="links">https://i.ibb.co/1/a.jpg
https://i.ibb.co/2/b.png</textarea>
    </div>
    <textarea name="links">outside the panel</textarea>
    <input type="file" id="upload">
  </form>
  <script>
    document.getElementById('album').addEventListener('change', function (e) {
      document.getElementById('changed').value = e.target.value;
    });
  </script>
</body>
</html>
"#;

struct Fixture {
    dir: TempDir,
    url: String,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let page = dir.path().join("index.html");
        fs::write(&page, FIXTURE_HTML).unwrap();
        let url = format!("file://{}", page.display());
        Self { dir, url }
    }

    fn utf8_dir(&self) -> Utf8PathBuf {
        Utf8PathBuf::try_from(self.dir.path().to_path_buf()).unwrap()
    }
}

fn open_fixture() -> (Fixture, BrowserSession<ChromeBackend>) {
    let fixture = Fixture::new();
    let mut session = BrowserSession::new(ChromeBackend::launch(true).expect("failed to launch Chrome"));
    session.navigate(&fixture.url).unwrap();
    (fixture, session)
}

#[test]
#[ignore]
fn test_navigate_and_current_url() {
    let (_fixture, session) = open_fixture();

    let url = session.current_url().unwrap();
    assert!(url.starts_with("file://"));
    assert!(url.ends_with("index.html"));
    assert!(Condition::UrlIs(url).holds(&*session).unwrap());
}

#[test]
#[ignore]
fn test_presence_by_name_id_and_class() {
    let (_fixture, session) = open_fixture();

    assert!(session.is_present(&Locator::name("login-subject")).unwrap());
    assert!(session.is_present(&Locator::id("album")).unwrap());
    assert!(session.is_present(&Locator::class("panel")).unwrap());
    assert!(!session.is_present(&Locator::id("no-such-element")).unwrap());
    // Class matching is by whole token
    assert!(!session.is_present(&Locator::class("pan")).unwrap());
}

#[test]
#[ignore]
fn test_visibility() {
    let (_fixture, session) = open_fixture();

    assert!(session.is_visible(&Locator::name("login-subject")).unwrap());
    assert!(session.is_visible(&Locator::id("album")).unwrap());
    assert!(!session.is_visible(&Locator::id("hidden")).unwrap());
    assert!(!session.is_visible(&Locator::id("collapsed")).unwrap());
}

#[test]
#[ignore]
fn test_missing_element_is_an_error() {
    let (_fixture, session) = open_fixture();

    match session.is_visible(&Locator::id("no-such-element")) {
        Err(BrowserError::ElementNotFound(locator)) => assert_eq!(locator, Locator::id("no-such-element")),
        other => panic!("Expected ElementNotFound, got {:?}", other),
    }
}

#[test]
#[ignore]
fn test_clickable_and_click() {
    let (_fixture, mut session) = open_fixture();

    assert!(!session.is_clickable(&Locator::id("disabled")).unwrap());
    assert!(!session.is_clickable(&Locator::id("hidden")).unwrap());
    assert!(session.is_clickable(&Locator::id("enabled")).unwrap());

    session.click(&Locator::id("enabled")).unwrap();
    assert_eq!(session.read_value(&Locator::id("clicked")).unwrap(), "yes");
}

#[test]
#[ignore]
fn test_type_text() {
    let (_fixture, mut session) = open_fixture();
    let field = Locator::name("login-subject");

    session.type_text(&field, "alice").unwrap();

    assert_eq!(session.read_value(&field).unwrap(), "alice");
}

#[test]
#[ignore]
fn test_select_by_value_fires_change() {
    let (_fixture, mut session) = open_fixture();
    let album = Locator::id("album");

    session.select_by_value(&album, "a2").unwrap();

    assert_eq!(session.read_value(&album).unwrap(), "a2");
    assert_eq!(session.read_value(&Locator::id("changed")).unwrap(), "a2");
}

#[test]
#[ignore]
fn test_select_by_unknown_value() {
    let (_fixture, mut session) = open_fixture();

    match session.select_by_value(&Locator::id("album"), "a9") {
        Err(BrowserError::OptionNotFound { option, .. }) => assert_eq!(option, "a9"),
        other => panic!("Expected OptionNotFound, got {:?}", other),
    }
    assert_eq!(session.read_value(&Locator::id("album")).unwrap(), "a1");
}

#[test]
#[ignore]
fn test_select_by_label_normalizes_whitespace() {
    let (_fixture, mut session) = open_fixture();
    let album = Locator::id("album");

    session.select_by_value(&album, "a2").unwrap();
    session.select_by_label(&album, "Holiday Trip").unwrap();

    assert_eq!(session.read_value(&album).unwrap(), "a1");
    assert_eq!(session.read_value(&Locator::id("changed")).unwrap(), "a1");
    assert!(matches!(
        session.select_by_label(&album, "Personal"),
        Err(BrowserError::OptionNotFound { .. })
    ));
}

#[test]
#[ignore]
fn test_read_value_within_scope() {
    let (_fixture, session) = open_fixture();
    let scoped = Locator::name("links").within(Locator::class("panel"));

    let text = session.read_value(&scoped).unwrap();

    assert_eq!(text, "https://i.ibb.co/1/a.jpg\nhttps://i.ibb.co/2/b.png");
}

#[test]
#[ignore]
fn test_attach_file() {
    let (fixture, mut session) = open_fixture();
    let photo = fixture.utf8_dir().join("photo.jpg");
    fs::write(&photo, b"not really a jpeg").unwrap();
    let input = Locator::xpath("//input[@type='file']");

    session.attach_file(&input, &photo).unwrap();

    // Browsers report a masked path for file inputs
    assert!(session.read_value(&input).unwrap().ends_with("photo.jpg"));
}

#[test]
#[ignore]
fn test_waiter_returns_once_condition_holds() {
    let (_fixture, session) = open_fixture();
    let waiter = Waiter::new(Duration::from_secs(5), Duration::from_millis(50));

    let start = Instant::now();
    waiter
        .until(&*session, &Condition::Visible(Locator::name("login-subject")))
        .unwrap();

    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
#[ignore]
fn test_waiter_times_out_on_hidden_element() {
    let (_fixture, session) = open_fixture();
    let timeout = Duration::from_millis(600);
    let waiter = Waiter::new(timeout, Duration::from_millis(100));

    let start = Instant::now();
    let result = waiter.until(&*session, &Condition::Visible(Locator::id("hidden")));

    assert!(start.elapsed() >= timeout);
    match result {
        Err(BrowserError::Timeout { condition, timeout: t }) => {
            assert_eq!(t, timeout);
            assert_eq!(condition, "visibility of id=hidden");
        }
        other => panic!("Expected Timeout, got {:?}", other),
    }
}

#[test]
#[ignore]
fn test_close_is_idempotent() {
    let fixture = Fixture::new();
    let mut backend = ChromeBackend::launch(true).expect("failed to launch Chrome");
    backend.navigate(&fixture.url).unwrap();

    backend.close();
    backend.close();
}
