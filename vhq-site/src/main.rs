mod app;
mod components;
mod context;
mod pages;
mod state;
mod timers;
mod transport;

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    yew::Renderer::<app::App>::new().render();
}
