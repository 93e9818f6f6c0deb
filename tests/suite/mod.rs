mod config_state;
mod fallback;
mod game;
mod proxy_roundtrip;
