use std::time::Duration;

use gloo_timers::callback::Timeout;
use yew::prelude::*;

use vhq_client::toast::{Toast, ToastKind};

fn icon(kind: ToastKind) -> &'static str {
    match kind {
        ToastKind::Success => "fas fa-check-circle",
        ToastKind::Error => "fas fa-exclamation-circle",
        ToastKind::Info => "fas fa-info-circle",
    }
}

#[derive(Properties, PartialEq)]
struct ToastItemProps {
    toast: Toast,
    lifetime: Duration,
    on_dismiss: Callback<u64>,
}

#[function_component(ToastItem)]
fn toast_item(
    ToastItemProps {
        toast,
        lifetime,
        on_dismiss,
    }: &ToastItemProps,
) -> Html {
    use_effect_with(toast.id, {
        let on_dismiss = on_dismiss.clone();
        let millis = u32::try_from(lifetime.as_millis()).unwrap_or(u32::MAX);
        move |id: &u64| {
            let id = *id;
            let timeout = Timeout::new(millis, move || on_dismiss.emit(id));
            move || drop(timeout)
        }
    });

    html! {
        <div class={classes!("notification", format!("notification-{}", toast.kind.as_str()), "show")}>
            <i class={icon(toast.kind)}></i>
            <span>{ &toast.message }</span>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ToastsProps {
    pub toasts: Vec<Toast>,
    pub lifetime: Duration,
    pub on_dismiss: Callback<u64>,
}

/// Notifications, each removed once `lifetime` has elapsed
#[function_component(Toasts)]
pub fn toasts(
    ToastsProps {
        toasts,
        lifetime,
        on_dismiss,
    }: &ToastsProps,
) -> Html {
    html! {
        <div class="notifications">
            {
                toasts.iter().map(|toast| html! {
                    <ToastItem key={toast.id} toast={toast.clone()} lifetime={*lifetime} on_dismiss={on_dismiss.clone()} />
                }).collect::<Html>()
            }
        </div>
    }
}
