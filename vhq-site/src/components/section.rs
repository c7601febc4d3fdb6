use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct LoadingProps {
    pub message: AttrValue,
}

#[function_component(Loading)]
pub fn loading(LoadingProps { message }: &LoadingProps) -> Html {
    html! {
        <div class="section loading-section">
            <div class="spinner"></div>
            <p>{ message }</p>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ErrorPanelProps {
    pub message: AttrValue,
    #[prop_or_default]
    pub on_retry: Option<Callback<MouseEvent>>,
}

#[function_component(ErrorPanel)]
pub fn error_panel(ErrorPanelProps { message, on_retry }: &ErrorPanelProps) -> Html {
    html! {
        <div class="section error-section">
            <i class="fas fa-exclamation-triangle"></i>
            <p class="error-text">{ message }</p>
            if let Some(on_retry) = on_retry {
                <button class="btn-secondary" onclick={on_retry.clone()}>{ "Try again" }</button>
            }
        </div>
    }
}
