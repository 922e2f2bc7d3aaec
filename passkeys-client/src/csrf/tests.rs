use super::*;

#[test]
fn token_is_found_among_other_cookies() {
    let header = "sessionid=abc; csrftoken=Zm9v%2Bbar;theme=dark";
    assert_eq!(
        token_from_cookie_header(header, CSRF_COOKIE_NAME).as_deref(),
        Some("Zm9v+bar")
    );
    assert_eq!(
        token_from_cookie_header(header, "theme").as_deref(),
        Some("dark")
    );
}

#[test]
fn prefix_of_another_cookie_does_not_match() {
    let header = "csrftoken_old=stale; xcsrftoken=nope";
    assert_eq!(token_from_cookie_header(header, CSRF_COOKIE_NAME), None);
}

#[test]
fn missing_cookie() {
    assert_eq!(token_from_cookie_header("", CSRF_COOKIE_NAME), None);
    assert_eq!(
        token_from_cookie_header("sessionid=abc", CSRF_COOKIE_NAME),
        None
    );
}

#[test]
fn empty_value_is_still_a_value() {
    assert_eq!(
        token_from_cookie_header("csrftoken=", CSRF_COOKIE_NAME).as_deref(),
        Some("")
    );
}
