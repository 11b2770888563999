//! Scene-level scenarios exercising the full step pipeline
