use axum::response::Html;

const INDEX_PAGE: &str = include_str!("../../assets/index.html");
const DELETE_PAGE: &str = include_str!("../../assets/delete.html");

pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

pub async fn delete_page_handler() -> Html<&'static str> {
    Html(DELETE_PAGE)
}
