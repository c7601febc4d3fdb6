use yew::prelude::*;
use yew_router::prelude::*;

use crate::context::ApiProvider;
use crate::pages::analyze::AnalyzePage;
use crate::pages::smart::SmartPage;

#[derive(Debug, Clone, PartialEq, Routable)]
pub enum Route {
    #[at("/")]
    Home,

    #[at("/smart")]
    Smart,

    #[not_found]
    #[at("/404")]
    NotFound,
}

fn switch(route: Route) -> Html {
    match route {
        Route::Home => {
            html! {
                <AnalyzePage>
                </AnalyzePage>
            }
        }
        Route::Smart => {
            html! {
                <SmartPage>
                </SmartPage>
            }
        }
        Route::NotFound => {
            html! {
                <Redirect<Route> to={Route::Home} />
            }
        }
    }
}

#[function_component(App)]
pub fn app() -> Html {
    html! {
        <ApiProvider>
            <BrowserRouter>
                <nav class="nav">
                    <Link<Route> to={Route::Home}>{ "Downloader" }</Link<Route>>
                    <Link<Route> to={Route::Smart}>{ "VideoHQ Pro" }</Link<Route>>
                </nav>
                <Switch<Route> render={switch} />
            </BrowserRouter>
        </ApiProvider>
    }
}
