pub(super) const STATEMENTS: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS cloud_logs (
    id BIGSERIAL PRIMARY KEY,
    email TEXT NOT NULL,
    username TEXT NOT NULL,
    device_id TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS account_reports (
    id BIGSERIAL PRIMARY KEY,
    email TEXT NOT NULL,
    username TEXT NOT NULL,
    wins_total BIGINT NOT NULL DEFAULT 0 CHECK (wins_total >= 0),
    losses_total BIGINT NOT NULL DEFAULT 0 CHECK (losses_total >= 0),
    has_won BOOLEAN NOT NULL DEFAULT FALSE,
    first_win_at TIMESTAMPTZ NULL,
    achievements_count BIGINT NOT NULL DEFAULT 0 CHECK (achievements_count >= 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT unique_account UNIQUE (email, username)
)
"#,
    "CREATE INDEX IF NOT EXISTS account_reports_updated_at_idx ON account_reports (updated_at DESC)",
    r#"
CREATE TABLE IF NOT EXISTS account_achievements (
    id BIGSERIAL PRIMARY KEY,
    email TEXT NOT NULL,
    username TEXT NOT NULL,
    achievement_key TEXT NOT NULL,
    unlocked_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT unique_achievement UNIQUE (email, username, achievement_key)
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS account_devices (
    id BIGSERIAL PRIMARY KEY,
    email TEXT NOT NULL,
    username TEXT NOT NULL,
    device_id TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT unique_device UNIQUE (email, username, device_id)
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS cloud_saves (
    id BIGSERIAL PRIMARY KEY,
    email TEXT NOT NULL,
    username TEXT NOT NULL,
    save_json TEXT NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT unique_email_username UNIQUE (email, username)
)
"#,
];
